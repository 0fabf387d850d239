//! `vault`: encrypted image storage with per-viewer forensic marks.
//!
//! Uploads are sealed under a fresh AES-256-GCM data key which is itself
//! wrapped under a process master key. When a recipient views an image it is
//! decrypted, marked invisibly with the viewer's identity (and optionally with
//! a visible stamp), and re-encoded as PNG. Leaked copies can later be scanned
//! to recover that identity.
//!
//! Startup sequence for a host process:
//! 1. Load and validate [`config::Config`] from environment variables.
//! 2. Initialise structured JSON logging with [`telemetry::init_telemetry`].
//! 3. Build an [`ImageVault`] with [`ImageVault::from_config`].

pub mod config;
pub mod crypto;
pub mod keys;
pub mod service;
pub mod telemetry;
pub mod watermark;

pub use service::{detect, ImageVault, SealedImage};
