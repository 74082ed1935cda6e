//! Target platform model for c2ast.
//!
//! A platform is identified by its target triple
//! (`arch-vendor-os[-environment]`). Two platforms travel with every
//! exploration: the one the caller requested and the one the C parser
//! actually resolved.
//!
//! - [`arch`]: Architecture component and its pointer width
//! - [`platform`]: The [`TargetPlatform`] value type

pub mod arch;
pub mod error;
pub mod platform;

pub use arch::Architecture;
pub use error::TargetError;
pub use platform::TargetPlatform;
