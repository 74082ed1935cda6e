//! The platform a translation unit was actually parsed for.

use c2ast_targets::TargetPlatform;

use crate::clang::ClangTranslationUnit;
use crate::error::Result;

/// Resolve the parser's target into a platform and its pointer width in bits.
pub fn resolve_platform<T: ClangTranslationUnit>(unit: &T) -> Result<(TargetPlatform, u32)> {
    let info = unit.target_info()?;
    let platform = TargetPlatform::new(info.triple, info.pointer_width)?;
    let width = platform.pointer_width_bits();
    Ok((platform, width))
}
