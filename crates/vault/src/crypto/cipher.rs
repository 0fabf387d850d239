//! AES-256-GCM encryption and decryption of whole buffers.
//!
//! Every call draws a fresh random 96-bit nonce from the OS CSPRNG, so a key
//! never sees the same nonce twice in practice. The 128-bit tag is kept
//! detached from the ciphertext so the flat at-rest layout can store it in
//! front of the body.

use aes_gcm::{
    aead::{rand_core::RngCore, AeadInPlace, KeyInit, OsRng},
    Aes256Gcm, Nonce, Tag,
};
use thiserror::Error;

use super::key::{Key256, KEY_LEN};

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of an AES-GCM authentication tag (16 bytes = 128 bits).
pub const TAG_LEN: usize = 16;

/// Output of [`encrypt`]: nonce, detached tag and ciphertext body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    /// Raw nonce bytes.
    pub nonce: [u8; NONCE_LEN],
    /// Authentication tag over `ciphertext` under `nonce`.
    pub auth_tag: [u8; TAG_LEN],
    /// Ciphertext, same length as the plaintext.
    pub ciphertext: Vec<u8>,
}

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// Key material is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid key length: expected {KEY_LEN} bytes, got {0}")]
    InvalidKeyLength(usize),

    /// AES-GCM encryption failed.
    #[error("aead operation failed")]
    AeadFailure,

    /// The authentication tag did not verify: wrong key, corrupted or
    /// tampered data.
    #[error("authentication tag mismatch")]
    Integrity,

    /// A serialized envelope or wrapped key does not match its expected layout.
    #[error("malformed encrypted data: {0}")]
    Format(&'static str),
}

/// Encrypt `plaintext` under `key` with a fresh random nonce.
///
/// # Errors
///
/// Returns [`CipherError::AeadFailure`] on an internal AEAD error (unreachable
/// with a valid key and a plaintext below the GCM length limit).
pub fn encrypt(key: &Key256, plaintext: &[u8]) -> Result<EncryptedPayload, CipherError> {
    let cipher = build_cipher(key)?;

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let mut ciphertext = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut ciphertext)
        .map_err(|_| CipherError::AeadFailure)?;

    let mut auth_tag = [0u8; TAG_LEN];
    auth_tag.copy_from_slice(&tag);

    Ok(EncryptedPayload {
        nonce,
        auth_tag,
        ciphertext,
    })
}

/// Decrypt an [`EncryptedPayload`] back to plaintext bytes.
///
/// Fails closed: no bytes are returned unless the tag verifies.
///
/// # Errors
///
/// Returns [`CipherError::Integrity`] if authentication fails.
pub fn decrypt(key: &Key256, payload: &EncryptedPayload) -> Result<Vec<u8>, CipherError> {
    let cipher = build_cipher(key)?;
    let mut buffer = payload.ciphertext.clone();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(&payload.nonce),
            b"",
            &mut buffer,
            Tag::from_slice(&payload.auth_tag),
        )
        .map_err(|_| CipherError::Integrity)?;
    Ok(buffer)
}

fn build_cipher(key: &Key256) -> Result<Aes256Gcm, CipherError> {
    Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CipherError::InvalidKeyLength(KEY_LEN))
}
