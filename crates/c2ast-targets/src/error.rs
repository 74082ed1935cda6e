//! Error types for target platform operations.

/// Errors that can occur while parsing or validating a target platform.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// The triple does not have at least `arch-vendor-os` components.
    #[error("invalid target triple '{triple}': {detail}")]
    InvalidTriple {
        /// The offending triple.
        triple: String,
        /// Description of what is wrong with it.
        detail: String,
    },

    /// The pointer width is not one a C target can have.
    #[error("invalid pointer width {bits} for target '{triple}'")]
    InvalidPointerWidth {
        /// The triple the width was given for.
        triple: String,
        /// The rejected width in bits.
        bits: u32,
    },
}

/// Result type for target operations.
pub type Result<T> = std::result::Result<T, TargetError>;
