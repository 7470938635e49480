//! Error types for archivist.

use thiserror::Error;

/// Top-level result type for archivist operations.
pub type Result<T> = std::result::Result<T, ArchivistError>;

/// Top-level error type for archivist.
#[derive(Debug, Error)]
pub enum ArchivistError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("vault error: {0}")]
    Vault(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors raised while validating the persisted configuration record.
///
/// These surface at configuration time and are never silently coerced.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no archive folder configured")]
    MissingArchiveFolder,

    #[error("invalid folder: {0}")]
    InvalidFolder(String),

    #[error("invalid root file: {0}")]
    InvalidRootFile(String),

    #[error("config file unreadable: {0}")]
    Read(String),
}
