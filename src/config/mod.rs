//! Configuration management for mptd
//!
//! Settings are layered, lowest to highest priority:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables
//! 4. Command-line flags (applied by the caller, see [`crate::cli`])
//!
//! # Environment Variables
//!
//! `MPTD__<section>__<key>` overrides a file setting, e.g.
//! `MPTD__API__ENDPOINT=https://api.treasuredata.co.jp` or
//! `MPTD__PLUGIN__QUALIFY_TABLE_NAMES=true`.
//!
//! The API key is only read from `TD_API_KEY` (or `--td-apikey`).
//!
//! # Configuration File
//!
//! `--config <path>`, else `MPTD_CONFIG`, else `config/mptd.toml`.
//! A missing file is not an error.

mod models;
mod sources;
mod validation;

pub use models::{ApiConfig, Config, PluginConfig};
pub use validation::ValidationError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources without validating it.
    ///
    /// For callers that layer command-line flags on top; they must call
    /// [`Config::validate`] once the flags are applied.
    pub fn load_unvalidated(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Ok(sources::load(path)?)
    }

    /// Load configuration from a specific path, without `.env` or secrets
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Re-check after command-line overrides have been applied
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate(self)?;
        Ok(())
    }
}
