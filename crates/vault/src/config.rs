//! Configuration loading and validation for the vault.
//!
//! All values are read from environment variables at startup. A malformed
//! master key is reported here, before any request is served.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

use crate::crypto::KEY_LEN;

/// Validated vault configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Base64-encoded 32-byte master key (`MASTER_KEY`). When absent or empty
    /// an ephemeral key is generated for the lifetime of the process.
    #[serde(default)]
    pub master_key: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether viewer renders also carry the visible identity stamp.
    #[serde(default = "default_visible_mark")]
    pub visible_mark: bool,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_visible_mark() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            master_key: None,
            log_level: default_log_level(),
            visible_mark: default_visible_mark(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("master_key", &self.master_key.as_ref().map(|_| "[REDACTED]"))
            .field("log_level", &self.log_level)
            .field("visible_mark", &self.visible_mark)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or if `MASTER_KEY` is
    /// present but is not base64 of exactly 32 bytes.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// The configured master key, with an empty value treated as absent.
    pub fn master_key_b64(&self) -> Option<&str> {
        self.master_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn validate(&self) -> Result<()> {
        if let Some(raw) = self.master_key_b64() {
            let decoded = STANDARD
                .decode(raw)
                .context("MASTER_KEY must be base64 encoded")?;
            if decoded.len() != KEY_LEN {
                anyhow::bail!(
                    "MASTER_KEY must decode to {KEY_LEN} bytes, got {}",
                    decoded.len()
                );
            }
        }
        if self.log_level.trim().is_empty() {
            anyhow::bail!("LOG_LEVEL must not be empty");
        }
        Ok(())
    }
}
