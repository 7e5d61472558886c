//! Error handling for apuracao
//!
//! The tax engines themselves are infallible; errors only exist at the
//! configuration boundary (reading and decoding scenario files). Those are
//! typed with thiserror and everything above them uses anyhow for context
//! chaining.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a tax configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error reading {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported configuration format '{0}' (expected .json or .toml)")]
    UnsupportedFormat(String),
}

/// Result type alias for apuracao operations
pub type Result<T> = anyhow::Result<T>;
