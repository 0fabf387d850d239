//! AES-256-GCM encryption of arbitrary byte buffers.
//!
//! This module is intentionally free of image and configuration dependencies.
//! It provides the primitives used by key wrapping and by the vault facade.
//!
//! # At-rest format
//!
//! ```text
//! nonce (12) || auth tag (16) || ciphertext (N)
//! ```
//!
//! The layout carries no version byte; it must stay readable by every
//! envelope already written to storage.

pub mod cipher;
pub mod envelope;
pub mod key;

pub use cipher::{decrypt, encrypt, CipherError, EncryptedPayload, NONCE_LEN, TAG_LEN};
pub use envelope::{deserialize, serialize};
pub use key::{generate_key, Key256, KEY_LEN};
