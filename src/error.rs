//! Error types for the contract lookup core
//!
//! Errors are layered: a `RecordSource` reports `SourceError`, the registry
//! wraps it in `RegistryError` only when there is no cached snapshot to fall
//! back on. A company name that matches nothing is not an error (`Ok(None)`).

use std::time::Duration;

use thiserror::Error;

/// Failures reported by a record source collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Record source unavailable: {0}")]
    Unavailable(String),

    #[error("Record source timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to decode source rows: {0}")]
    Decode(String),
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

/// Errors surfaced by `ContractRegistry` operations
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The source failed and no earlier snapshot exists to serve instead
    #[error("No cached data available: {0}")]
    SourceUnavailable(#[from] SourceError),
}

pub type Result<T, E = RegistryError> = std::result::Result<T, E>;
