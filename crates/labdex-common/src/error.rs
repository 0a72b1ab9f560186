//! Error types shared across the labdex workspace

use thiserror::Error;

/// Result type alias for labdex operations
pub type Result<T> = std::result::Result<T, LabdexError>;

/// Cross-cutting error type for configuration and process setup
#[derive(Error, Debug)]
pub enum LabdexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
