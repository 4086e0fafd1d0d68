//! Error types for the CareerLens domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum, folded into [`Error`].

use thiserror::Error;

/// The top-level error type for all CareerLens operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Generation errors ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    // --- Input validation ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of the reflection store.
///
/// Only [`StoreError::Connection`] is considered transient; the connection
/// guard retries it and nothing else.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Connection failed after {attempts} attempt(s): {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("Operation failed: {0}")]
    Operation(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

impl StoreError {
    /// Whether this failure happened while establishing a connection.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            StoreError::Connection(_) | StoreError::RetriesExhausted { .. }
        )
    }
}

/// Failures talking to the external text-generation service.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// The upstream call exceeded the client timeout. Carries a
    /// user-facing localized message.
    #[error("{0}")]
    Timeout(String),

    #[error("Request to generation service failed: {0}")]
    Transport(String),

    #[error("{0}")]
    Parse(String),

    #[error("Generation service not configured: {0}")]
    NotConfigured(String),
}
