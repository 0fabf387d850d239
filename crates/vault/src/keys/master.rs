//! [`MasterKey`]: the process-wide key-encryption key.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::crypto::{Key256, KEY_LEN};

/// Errors raised while materialising the master key.
///
/// These are startup failures, never per-request ones.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `MASTER_KEY` is present but is not valid base64.
    #[error("MASTER_KEY must be base64 encoded")]
    InvalidMasterKeyEncoding,

    /// `MASTER_KEY` decodes to the wrong number of bytes.
    #[error("MASTER_KEY must decode to {KEY_LEN} bytes, got {0}")]
    InvalidMasterKeyLength(usize),
}

/// Where the master key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    /// Supplied through configuration; survives restarts.
    Configured,
    /// Generated for this process only; nothing wrapped under it can be
    /// unwrapped after the process exits.
    Ephemeral,
}

/// The key under which every per-object data key is wrapped.
#[derive(Debug, Clone)]
pub struct MasterKey {
    key: Key256,
    origin: KeyOrigin,
}

impl MasterKey {
    /// Build a configured master key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMasterKeyLength`] if `bytes` is not 32 long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let key = Key256::from_slice(bytes)
            .map_err(|_| ConfigError::InvalidMasterKeyLength(bytes.len()))?;
        Ok(Self {
            key,
            origin: KeyOrigin::Configured,
        })
    }

    /// Generate a random master key that lives only as long as this value.
    pub fn ephemeral() -> Self {
        Self {
            key: Key256::generate(),
            origin: KeyOrigin::Ephemeral,
        }
    }

    /// Materialise the master key described by `cfg`.
    ///
    /// Emits a warning when falling back to an ephemeral key.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a configured key is malformed.
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        match cfg.master_key_b64() {
            Some(raw) => {
                let bytes = STANDARD
                    .decode(raw)
                    .map_err(|_| ConfigError::InvalidMasterKeyEncoding)?;
                let key = Self::from_bytes(&bytes)?;
                info!("master key loaded from configuration");
                Ok(key)
            }
            None => {
                warn!("MASTER_KEY missing; generated ephemeral key for this process only");
                Ok(Self::ephemeral())
            }
        }
    }

    /// Borrow the underlying key material.
    pub fn key(&self) -> &Key256 {
        &self.key
    }

    /// Where this key came from.
    pub fn origin(&self) -> KeyOrigin {
        self.origin
    }

    /// Returns `true` if this key was generated for the current process only.
    pub fn is_ephemeral(&self) -> bool {
        self.origin == KeyOrigin::Ephemeral
    }
}

static PROCESS_MASTER_KEY: OnceCell<Arc<MasterKey>> = OnceCell::new();

/// Return the process-wide master key, materialising it from `cfg` on first use.
///
/// Initialisation runs at most once even under concurrent first access, so
/// two callers can never observe different ephemeral keys. Later calls ignore
/// `cfg` and return the cached key.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the first initialisation fails; a later call
/// retries.
pub fn process_master_key(cfg: &Config) -> Result<Arc<MasterKey>, ConfigError> {
    PROCESS_MASTER_KEY
        .get_or_try_init(|| MasterKey::from_config(cfg).map(Arc::new))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(key: Option<String>) -> Config {
        Config {
            master_key: key,
            ..Config::default()
        }
    }

    #[test]
    fn configured_key_is_decoded() {
        let encoded = STANDARD.encode([5u8; KEY_LEN]);
        let master = MasterKey::from_config(&cfg(Some(encoded))).unwrap();
        assert_eq!(master.origin(), KeyOrigin::Configured);
        assert_eq!(master.key().as_bytes(), &[5u8; KEY_LEN]);
    }

    #[test]
    fn absent_key_is_ephemeral() {
        let master = MasterKey::from_config(&cfg(None)).unwrap();
        assert!(master.is_ephemeral());
        let again = MasterKey::from_config(&cfg(None)).unwrap();
        assert_ne!(master.key(), again.key());
    }

    #[test]
    fn wrong_length_is_config_error() {
        let encoded = STANDARD.encode([5u8; 31]);
        assert!(matches!(
            MasterKey::from_config(&cfg(Some(encoded))),
            Err(ConfigError::InvalidMasterKeyLength(31))
        ));
    }

    #[test]
    fn bad_encoding_is_config_error() {
        assert!(matches!(
            MasterKey::from_config(&cfg(Some("%%%".into()))),
            Err(ConfigError::InvalidMasterKeyEncoding)
        ));
    }

    #[test]
    fn process_key_is_initialised_once() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| process_master_key(&Config::default()).unwrap()))
            .collect();
        let keys: Vec<Arc<MasterKey>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for key in &keys[1..] {
            assert!(Arc::ptr_eq(&keys[0], key));
        }
        // Later configuration is ignored once the key exists.
        let configured = cfg(Some(STANDARD.encode([1u8; KEY_LEN])));
        let later = process_master_key(&configured).unwrap();
        assert!(Arc::ptr_eq(&keys[0], &later));
    }
}
