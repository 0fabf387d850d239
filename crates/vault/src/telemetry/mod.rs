//! Structured logging setup for processes embedding the vault.
//!
//! # Telemetry invariants
//!
//! - **No key material, plaintext or identity text** may appear in any log
//!   field. Identities are only ever logged by length.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//!   takes precedence when set.

pub mod init;

pub use init::init_telemetry;
