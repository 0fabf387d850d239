//! Async facade called by the route layer.
//!
//! # Responsibilities
//! - Seal uploaded images: fresh data key, AES-256-GCM envelope, key wrapped
//!   under the master key.
//! - Open sealed images for the owner's preview or a recipient's view, the
//!   latter carrying the viewer's invisible and visible marks.
//! - Scan suspect images for an embedded viewer identity.
//!
//! Every operation is CPU-bound and runs on tokio's blocking pool so that
//! concurrent requests never stall the async workers.

mod errors;

use std::sync::Arc;

use common::protocol::DetectionReport;
use common::ServiceError;
use tracing::debug;

use crate::config::Config;
use crate::crypto::{self, generate_key};
use crate::keys::{self, MasterKey};
use crate::watermark::{self, RawImage};

/// An image as the persistence layer stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedImage {
    /// `nonce || tag || ciphertext` of the original upload.
    pub envelope: Vec<u8>,
    /// Data key wrapped under the master key (`nonce:tag:ciphertext`, base64).
    pub key_encrypted: String,
}

/// Shared handle over the master key; cheap to clone per request.
#[derive(Clone, Debug)]
pub struct ImageVault {
    master: Arc<MasterKey>,
    visible_mark: bool,
}

impl ImageVault {
    /// Create a vault over an explicit master key.
    pub fn new(master: Arc<MasterKey>, visible_mark: bool) -> Self {
        Self {
            master,
            visible_mark,
        }
    }

    /// Create a vault over the process-wide master key described by `cfg`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Unavailable`] if the configured key is malformed.
    pub fn from_config(cfg: &Config) -> Result<Self, ServiceError> {
        let master = keys::process_master_key(cfg)?;
        Ok(Self::new(master, cfg.visible_mark))
    }

    /// Returns `true` if sealed images are bound to this process only.
    pub fn is_ephemeral(&self) -> bool {
        self.master.is_ephemeral()
    }

    /// Encrypt an uploaded image under a fresh data key.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EncryptionFailure`] if the AEAD layer fails.
    pub async fn seal(&self, image: Vec<u8>) -> Result<SealedImage, ServiceError> {
        let master = Arc::clone(&self.master);
        blocking(move || {
            let data_key = generate_key();
            let payload = crypto::encrypt(&data_key, &image)?;
            let key_encrypted = keys::wrap_key(&master, &data_key)?;
            debug!(plaintext_len = image.len(), "image sealed");
            Ok(SealedImage {
                envelope: crypto::serialize(&payload),
                key_encrypted,
            })
        })
        .await
    }

    /// Decrypt a sealed image back to its original bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::BadRequest`] for a malformed envelope or wrapped
    /// key and [`ServiceError::EncryptionFailure`] if either tag fails to verify.
    pub async fn open(&self, sealed: &SealedImage) -> Result<Vec<u8>, ServiceError> {
        let master = Arc::clone(&self.master);
        let sealed = sealed.clone();
        blocking(move || open_sealed(&master, &sealed)).await
    }

    /// Owner preview: decrypt and re-encode as PNG without any mark.
    ///
    /// # Errors
    ///
    /// As [`ImageVault::open`], plus [`ServiceError::BadRequest`] if the
    /// decrypted bytes are not a supported image.
    pub async fn preview(&self, sealed: &SealedImage) -> Result<Vec<u8>, ServiceError> {
        let master = Arc::clone(&self.master);
        let sealed = sealed.clone();
        blocking(move || {
            let plaintext = open_sealed(&master, &sealed)?;
            Ok(RawImage::decode(&plaintext)?.encode_png()?)
        })
        .await
    }

    /// Recipient view: decrypt, embed `viewer` invisibly and, when enabled,
    /// stamp it visibly in the corner.
    ///
    /// # Errors
    ///
    /// As [`ImageVault::preview`], plus [`ServiceError::BadRequest`] if the
    /// identity is empty, too long or a repeated unit, or the image too small
    /// to carry it.
    pub async fn view(&self, sealed: &SealedImage, viewer: &str) -> Result<Vec<u8>, ServiceError> {
        let master = Arc::clone(&self.master);
        let sealed = sealed.clone();
        let viewer = viewer.to_owned();
        let visible_mark = self.visible_mark;
        blocking(move || {
            let plaintext = open_sealed(&master, &sealed)?;
            let raw = RawImage::decode(&plaintext)?;
            let marked = watermark::embed_watermark(&raw, &viewer)?;
            if !visible_mark {
                return Ok(marked);
            }
            Ok(watermark::apply_visible_mark(&marked, &viewer)?)
        })
        .await
    }

    /// Scan a suspect image for an embedded identity.
    ///
    /// # Errors
    ///
    /// See [`detect`].
    pub async fn detect(&self, image: Vec<u8>) -> Result<DetectionReport, ServiceError> {
        detect(image).await
    }
}

/// Scan a suspect image for an embedded identity; needs no key material.
///
/// # Errors
///
/// Returns [`ServiceError::BadRequest`] if the bytes are not a decodable RGB(A)
/// image. An unmarked image is a successful, empty report.
pub async fn detect(image: Vec<u8>) -> Result<DetectionReport, ServiceError> {
    blocking(move || Ok(watermark::detect_watermark(&image)?.into())).await
}

fn open_sealed(master: &MasterKey, sealed: &SealedImage) -> Result<Vec<u8>, ServiceError> {
    let data_key = keys::unwrap_key(master, &sealed.key_encrypted)?;
    let payload = crypto::deserialize(&sealed.envelope)?;
    Ok(crypto::decrypt(&data_key, &payload)?)
}

/// Run `work` on the blocking pool and flatten the join error.
async fn blocking<T, F>(work: F) -> Result<T, ServiceError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ServiceError::Internal(format!("worker task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KEY_LEN;

    fn vault(visible_mark: bool) -> ImageVault {
        let master = MasterKey::from_bytes(&[0x42u8; KEY_LEN]).unwrap();
        ImageVault::new(Arc::new(master), visible_mark)
    }

    fn grey_png(size: u32) -> Vec<u8> {
        RawImage::new(size, size, 3, vec![90; (size * size * 3) as usize])
            .unwrap()
            .encode_png()
            .unwrap()
    }

    #[tokio::test]
    async fn seal_open_round_trip() {
        let vault = vault(true);
        let original = b"arbitrary upload bytes".to_vec();
        let sealed = vault.seal(original.clone()).await.unwrap();
        assert_ne!(sealed.envelope[28..], original[..]);
        assert_eq!(sealed.key_encrypted.split(':').count(), 3);
        assert_eq!(vault.open(&sealed).await.unwrap(), original);
    }

    #[test]
    fn vaults_from_config_share_one_process_key() {
        let cfg = Config::default();
        let a = ImageVault::from_config(&cfg).unwrap();
        let b = ImageVault::from_config(&cfg).unwrap();
        assert!(Arc::ptr_eq(&a.master, &b.master));
    }

    #[tokio::test]
    async fn open_with_other_master_fails_closed() {
        let sealed = vault(true).seal(b"x".to_vec()).await.unwrap();
        let other = ImageVault::new(Arc::new(MasterKey::ephemeral()), true);
        let err = other.open(&sealed).await.unwrap_err();
        assert_eq!(err.http_status(), 500);
        assert!(other.is_ephemeral());
    }

    #[tokio::test]
    async fn truncated_envelope_is_bad_request() {
        let vault = vault(true);
        let mut sealed = vault.seal(b"x".to_vec()).await.unwrap();
        sealed.envelope.truncate(10);
        let err = vault.open(&sealed).await.unwrap_err();
        assert_eq!(err.http_status(), 400);
    }

    #[tokio::test]
    async fn preview_transcodes_to_png() {
        let vault = vault(true);
        let sealed = vault.seal(grey_png(20)).await.unwrap();
        let png = vault.preview(&sealed).await.unwrap();
        let raw = RawImage::decode(&png).unwrap();
        assert_eq!((raw.width(), raw.height()), (20, 20));
    }

    #[tokio::test]
    async fn preview_of_non_image_is_bad_request() {
        let vault = vault(true);
        let sealed = vault.seal(b"not an image".to_vec()).await.unwrap();
        assert_eq!(vault.preview(&sealed).await.unwrap_err().http_status(), 400);
    }

    #[tokio::test]
    async fn view_rejects_oversized_identity() {
        let vault = vault(false);
        let sealed = vault.seal(grey_png(32)).await.unwrap();
        let err = vault.view(&sealed, &"v".repeat(300)).await.unwrap_err();
        assert_eq!(err.http_status(), 400);
    }

    #[tokio::test]
    async fn detect_on_garbage_is_bad_request() {
        let err = detect(b"nope".to_vec()).await.unwrap_err();
        assert_eq!(err.http_status(), 400);
    }
}
