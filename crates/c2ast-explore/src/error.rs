//! Exploration error types.
//!
//! Every variant here is fatal: the run is aborted and no partial AST is
//! returned. Recoverable conditions are reported as
//! [`Diagnostic`](crate::diagnostic::Diagnostic)s instead.

use crate::clang::{CursorKind, TypeKind};

/// Errors that abort an exploration run.
#[derive(Debug, thiserror::Error)]
pub enum ExploreError {
    /// The classifier reached a type kind it cannot interpret.
    #[error("unknown type kind '{kind:?}' for type '{spelling}'")]
    UnknownTypeKind { kind: TypeKind, spelling: String },

    /// An anonymous declaration reached without a parent to name it after.
    #[error("anonymous {kind:?} '{spelling}' has no parent to name it after")]
    UnknownAnonymousCursor { kind: CursorKind, spelling: String },

    /// No naming rule produced a name for a visitable type.
    #[error("type name was not found for type '{spelling}'")]
    EmptyTypeName { spelling: String },

    /// A location lookup was asked for a cursor that has no declaration.
    #[error("expected a valid cursor when getting the location of '{spelling}'")]
    NoDeclarationFound { spelling: String },

    /// The parser could not report its target.
    #[error("target info unavailable: {detail}")]
    TargetInfo { detail: String },

    /// A serialized translation unit is internally inconsistent.
    #[error("invalid translation unit: {detail}")]
    InvalidUnit { detail: String },

    /// Configuration could not be parsed.
    #[error("invalid explorer configuration: {detail}")]
    InvalidConfig { detail: String },

    /// Target platform error.
    #[error("target error: {0}")]
    Target(#[from] c2ast_targets::TargetError),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for exploration.
pub type Result<T> = std::result::Result<T, ExploreError>;
