//! `nonce:tag:ciphertext` wrapping of data keys under the master key.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::master::MasterKey;
use crate::crypto::{decrypt, encrypt, CipherError, EncryptedPayload, Key256, NONCE_LEN, TAG_LEN};

/// Separator between the three base64 segments of a wrapped key.
pub const SEGMENT_SEPARATOR: char = ':';

/// Encrypt `data_key` under the master key and encode it as
/// `<b64 nonce>:<b64 tag>:<b64 ciphertext>`.
///
/// # Errors
///
/// Returns [`CipherError::AeadFailure`] if the AEAD layer fails.
pub fn wrap_key(master: &MasterKey, data_key: &Key256) -> Result<String, CipherError> {
    let payload = encrypt(master.key(), data_key.as_bytes())?;
    Ok(format!(
        "{}{SEGMENT_SEPARATOR}{}{SEGMENT_SEPARATOR}{}",
        STANDARD.encode(payload.nonce),
        STANDARD.encode(payload.auth_tag),
        STANDARD.encode(&payload.ciphertext),
    ))
}

/// Recover a data key from a string produced by [`wrap_key`].
///
/// # Errors
///
/// Returns [`CipherError::Format`] if a segment is missing, is not base64, or
/// has the wrong length, and [`CipherError::Integrity`] if the tag does not
/// verify under `master`.
pub fn unwrap_key(master: &MasterKey, wrapped: &str) -> Result<Key256, CipherError> {
    let mut parts = wrapped.trim().splitn(3, SEGMENT_SEPARATOR);
    let mut segment = || -> Result<Vec<u8>, CipherError> {
        let part = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or(CipherError::Format("wrapped key must have three segments"))?;
        STANDARD
            .decode(part)
            .map_err(|_| CipherError::Format("wrapped key segment is not base64"))
    };
    let nonce_bytes = segment()?;
    let tag_bytes = segment()?;
    let ciphertext = segment()?;

    let nonce: [u8; NONCE_LEN] = nonce_bytes
        .try_into()
        .map_err(|_| CipherError::Format("wrapped key nonce must be 12 bytes"))?;
    let auth_tag: [u8; TAG_LEN] = tag_bytes
        .try_into()
        .map_err(|_| CipherError::Format("wrapped key tag must be 16 bytes"))?;

    let payload = EncryptedPayload {
        nonce,
        auth_tag,
        ciphertext,
    };
    let plaintext = decrypt(master.key(), &payload)?;
    Key256::from_slice(&plaintext)
        .map_err(|_| CipherError::Format("wrapped key does not hold a 256-bit key"))
}
