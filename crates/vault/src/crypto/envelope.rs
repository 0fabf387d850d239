//! Flat at-rest layout for [`EncryptedPayload`].

use super::cipher::{CipherError, EncryptedPayload, NONCE_LEN, TAG_LEN};

/// Length of the fixed prefix: nonce followed by tag.
pub const HEADER_LEN: usize = NONCE_LEN + TAG_LEN;

/// Lay out `payload` as `nonce || auth_tag || ciphertext`.
pub fn serialize(payload: &EncryptedPayload) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + payload.ciphertext.len());
    out.extend_from_slice(&payload.nonce);
    out.extend_from_slice(&payload.auth_tag);
    out.extend_from_slice(&payload.ciphertext);
    out
}

/// Parse bytes produced by [`serialize`].
///
/// # Errors
///
/// Returns [`CipherError::Format`] if `bytes` is shorter than [`HEADER_LEN`].
pub fn deserialize(bytes: &[u8]) -> Result<EncryptedPayload, CipherError> {
    if bytes.len() < HEADER_LEN {
        return Err(CipherError::Format("envelope shorter than nonce and tag"));
    }
    let (nonce_bytes, rest) = bytes.split_at(NONCE_LEN);
    let (tag_bytes, ciphertext) = rest.split_at(TAG_LEN);

    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(nonce_bytes);
    let mut auth_tag = [0u8; TAG_LEN];
    auth_tag.copy_from_slice(tag_bytes);

    Ok(EncryptedPayload {
        nonce,
        auth_tag,
        ciphertext: ciphertext.to_vec(),
    })
}
