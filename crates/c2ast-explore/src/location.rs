//! Portable source locations.

use c2ast_core::CLocation;

use crate::clang::{ClangTranslationUnit, CursorKind, TypeKind};
use crate::config::{ExploreConfig, LinkedPath};
use crate::error::{ExploreError, Result};

const SEPARATORS: [char; 2] = ['/', '\\'];

/// Turns parser cursors into [`CLocation`]s, applying directory remapping
/// and include-directory shortening.
#[derive(Debug, Clone)]
pub struct LocationResolver {
    unit_path: String,
    full_paths: bool,
    user_include_directories: Vec<String>,
    linked_paths: Vec<LinkedPath>,
}

impl LocationResolver {
    pub fn new(unit_path: impl Into<String>, config: &ExploreConfig) -> Self {
        Self {
            unit_path: unit_path.into(),
            full_paths: config.explorer.location_full_paths,
            user_include_directories: config.user_include_directories.clone(),
            linked_paths: config.linked_paths.clone(),
        }
    }

    /// Location of `cursor`, seen as the declaration of `ty`.
    ///
    /// Pointers, arrays and primitives have no declaration site and get the
    /// null location, as do the translation unit itself and function types
    /// not reached through their own declaration. The rule follows the type,
    /// so an `int` variable or field has the null location too.
    pub fn location<T: ClangTranslationUnit>(
        &self,
        unit: &T,
        cursor: T::Cursor,
        ty: T::Type,
    ) -> Result<CLocation> {
        let cursor_kind = unit.cursor_kind(cursor);
        let type_kind = unit.type_kind(ty);

        if cursor_kind == CursorKind::TranslationUnit {
            return Ok(CLocation::none());
        }
        if type_kind.is_function() && cursor_kind != CursorKind::FunctionDecl {
            return Ok(CLocation::none());
        }
        if type_kind == TypeKind::Pointer || type_kind.is_array() || type_kind.is_primitive() {
            return Ok(CLocation::none());
        }
        if cursor_kind == CursorKind::NoDeclFound {
            return Err(ExploreError::NoDeclarationFound {
                spelling: unit.type_spelling(ty),
            });
        }

        let resolved = unit.cursor_location(cursor);
        let path = resolved.file.unwrap_or_else(|| self.unit_path.clone());
        let path = self.shorten(self.remap(path));
        let file_name = path
            .rsplit(SEPARATORS)
            .next()
            .unwrap_or_default()
            .to_string();

        Ok(CLocation {
            file_name,
            file_path: path,
            line_number: resolved.line,
            line_column: resolved.column,
        })
    }

    fn remap(&self, path: String) -> String {
        match self.linked_paths.iter().find(|l| path.contains(&l.from)) {
            Some(link) => path
                .replace(&link.from, &link.to)
                .trim_matches(SEPARATORS)
                .to_string(),
            None => path,
        }
    }

    fn shorten(&self, path: String) -> String {
        if self.full_paths {
            return path;
        }
        match self
            .user_include_directories
            .iter()
            .find(|dir| !dir.is_empty() && path.contains(dir.as_str()))
        {
            Some(dir) => path
                .replace(dir.as_str(), "")
                .trim_matches(SEPARATORS)
                .to_string(),
            None => path,
        }
    }
}
