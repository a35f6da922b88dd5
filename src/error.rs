//! Error types for SquirrelDB
//!
//! Provides a unified error type for all operations. A missing record is
//! not an error: lookups return `Option`.

use thiserror::Error;

/// Result type alias using SquirrelError
pub type Result<T> = std::result::Result<T, SquirrelError>;

/// Unified error type for SquirrelDB operations
#[derive(Debug, Error)]
pub enum SquirrelError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt data: {0}")]
    CorruptData(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Request Errors
    // -------------------------------------------------------------------------
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SquirrelError {
    /// Whether the error came from bad client input rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, SquirrelError::MalformedInput(_))
    }
}
