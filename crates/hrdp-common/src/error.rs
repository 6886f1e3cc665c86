//! Error types for HRDP

use thiserror::Error;

/// Result type alias for HRDP operations
pub type Result<T> = std::result::Result<T, HrdpError>;

/// Main error type for HRDP
#[derive(Error, Debug)]
pub enum HrdpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
