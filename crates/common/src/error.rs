//! Common error types shared across crates.

use thiserror::Error;

use crate::protocol::ErrorResponse;

/// Top-level error returned by the vault facade.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::EncryptionFailure`] → 500
/// - [`ServiceError::Unavailable`] → 503
/// - [`ServiceError::Internal`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller-supplied input was malformed: an envelope or wrapped key that
    /// does not parse, an identity that is too long, or image bytes that do
    /// not decode.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// An authentication tag did not verify, or the AEAD layer failed.
    #[error("encryption failure: {0}")]
    EncryptionFailure(String),

    /// The master key could not be materialised from configuration.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// An unexpected internal error occurred (e.g. a worker task panicked).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::EncryptionFailure(_) => 500,
            ServiceError::Unavailable(_) => 503,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in [`ErrorResponse::code`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::EncryptionFailure(_) => "encryption_failure",
            ServiceError::Unavailable(_) => "service_unavailable",
            ServiceError::Internal(_) => "internal_error",
        }
    }

    /// Build the response body for this error.
    ///
    /// Integrity and internal failures get a fixed message so that nothing
    /// about the ciphertext or key state leaks to the caller.
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            ServiceError::BadRequest(m) | ServiceError::Unavailable(m) => m.clone(),
            ServiceError::EncryptionFailure(_) => "stored object could not be decrypted".into(),
            ServiceError::Internal(_) => "internal error".into(),
        };
        ErrorResponse::new(self.code(), message)
    }
}
