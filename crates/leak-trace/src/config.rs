//! Configuration loading and validation for `leak-trace`.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated scanner configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Tracing log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build leak-trace configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise leak-trace configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Apply a command-line override on top of the environment.
    pub fn with_log_level(mut self, level: Option<String>) -> Result<Self> {
        if let Some(level) = level {
            self.log_level = level;
            self.validate()?;
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.log_level.trim().is_empty() {
            anyhow::bail!("LOG_LEVEL must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_quiet() {
        assert_eq!(default_log_level(), "warn");
    }

    #[test]
    fn override_replaces_level() {
        let cfg = Config {
            log_level: "warn".into(),
        };
        let cfg = cfg.with_log_level(Some("debug".into())).unwrap();
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn override_rejects_empty_level() {
        let cfg = Config {
            log_level: "warn".into(),
        };
        assert!(cfg.with_log_level(Some(" ".into())).is_err());
    }

    #[test]
    fn no_override_keeps_level() {
        let cfg = Config {
            log_level: "info".into(),
        };
        assert_eq!(cfg.with_log_level(None).unwrap().log_level, "info");
    }
}
