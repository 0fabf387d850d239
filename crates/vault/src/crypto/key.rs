//! [`Key256`]: owned 256-bit symmetric key material.

use aes_gcm::aead::{rand_core::RngCore, OsRng};

use super::cipher::CipherError;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// Used both for per-object data keys and for the master key. When this type
/// is dropped, the memory is overwritten with zeroes to minimise the window
/// during which plaintext key material lives in RAM.
#[derive(Clone, PartialEq, Eq)]
pub struct Key256(Box<[u8; KEY_LEN]>);

impl Key256 {
    /// Generate a fresh key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut buf = Box::new([0u8; KEY_LEN]);
        OsRng.fill_bytes(&mut buf[..]);
        Self(buf)
    }

    /// Copy key material out of a slice.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] if `bytes` is not [`KEY_LEN`] long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CipherError> {
        if bytes.len() != KEY_LEN {
            return Err(CipherError::InvalidKeyLength(bytes.len()));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl From<[u8; KEY_LEN]> for Key256 {
    fn from(bytes: [u8; KEY_LEN]) -> Self {
        Self(Box::new(bytes))
    }
}

impl Drop for Key256 {
    fn drop(&mut self) {
        // Zero the key material on drop.
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for Key256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, not even in debug builds.
        f.write_str("Key256([REDACTED])")
    }
}

/// Generate a fresh random 256-bit data key.
pub fn generate_key() -> Key256 {
    Key256::generate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_differ() {
        assert_ne!(generate_key(), generate_key());
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert!(matches!(
            Key256::from_slice(&[0u8; 16]),
            Err(CipherError::InvalidKeyLength(16))
        ));
    }

    #[test]
    fn from_slice_copies_bytes() {
        let key = Key256::from_slice(&[0x42u8; KEY_LEN]).unwrap();
        assert_eq!(key.as_bytes(), &[0x42u8; KEY_LEN]);
    }

    #[test]
    fn key_redacted_in_debug() {
        let key = Key256::from([0xFFu8; KEY_LEN]);
        let printed = format!("{key:?}");
        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains("255"));
    }
}
