//! Master key acquisition and envelope key wrapping.
//!
//! # Lifecycle
//!
//! 1. At startup, [`process_master_key`] materialises the master key from
//!    [`Config`](crate::config::Config) exactly once per process. Without a
//!    configured key an ephemeral one is generated and a warning is emitted.
//! 2. Each stored image gets its own random data key; [`wrap_key`] encrypts it
//!    under the master key into a `nonce:tag:ciphertext` base64 string that the
//!    persistence layer keeps next to the object.
//! 3. On read, [`unwrap_key`] reverses the wrapping and fails closed on any
//!    tag mismatch.
//!
//! # Security invariants
//!
//! - Neither the master key nor any data key is ever logged or persisted here.
//! - An ephemeral master key makes every wrapped key unreadable after restart.

pub mod master;
pub mod wrap;

pub use master::{process_master_key, ConfigError, KeyOrigin, MasterKey};
pub use wrap::{unwrap_key, wrap_key};
