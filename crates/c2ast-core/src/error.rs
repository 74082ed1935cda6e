//! AST error types.

/// Errors that can occur while persisting or loading an AST snapshot.
#[derive(Debug, thiserror::Error)]
pub enum AstError {
    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for AST operations.
pub type Result<T> = std::result::Result<T, AstError>;
