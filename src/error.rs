//! Error types for the Scamguard service.

use thiserror::Error;

use crate::retry::ProviderError;

/// Main error type for Scamguard operations.
#[derive(Error, Debug)]
pub enum ScamguardError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Quiz catalog loading errors
    #[error("Quiz catalog error: {0}")]
    Catalog(String),

    /// Text-generation provider errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// HTTP server errors
    #[error("Server error: {0}")]
    Server(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Scamguard operations.
pub type Result<T> = std::result::Result<T, ScamguardError>;
