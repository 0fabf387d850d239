//! Mapping of module errors onto the boundary [`ServiceError`].

use common::ServiceError;

use crate::crypto::CipherError;
use crate::keys::ConfigError;
use crate::watermark::WatermarkError;

impl From<CipherError> for ServiceError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::Format(_) => ServiceError::BadRequest(err.to_string()),
            CipherError::Integrity
            | CipherError::AeadFailure
            | CipherError::InvalidKeyLength(_) => ServiceError::EncryptionFailure(err.to_string()),
        }
    }
}

impl From<WatermarkError> for ServiceError {
    fn from(err: WatermarkError) -> Self {
        ServiceError::BadRequest(err.to_string())
    }
}

impl From<ConfigError> for ServiceError {
    fn from(err: ConfigError) -> Self {
        ServiceError::Unavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrity_maps_to_500() {
        let e = ServiceError::from(CipherError::Integrity);
        assert_eq!(e.http_status(), 500);
    }

    #[test]
    fn format_maps_to_400() {
        let e = ServiceError::from(CipherError::Format("envelope shorter than nonce and tag"));
        assert_eq!(e.http_status(), 400);
        assert!(e.to_string().contains("envelope"));
    }

    #[test]
    fn watermark_errors_map_to_400() {
        let e = ServiceError::from(WatermarkError::PayloadTooLarge(300));
        assert_eq!(e.http_status(), 400);
        let e = ServiceError::from(WatermarkError::ImageTooSmall {
            needed: 48,
            capacity: 16,
        });
        assert_eq!(e.http_status(), 400);
    }

    #[test]
    fn config_errors_map_to_503() {
        let e = ServiceError::from(ConfigError::InvalidMasterKeyLength(16));
        assert_eq!(e.http_status(), 503);
    }
}
