//! Portable source locations.

use serde::{Deserialize, Serialize};

/// Where a declaration lives in the C sources.
///
/// The default value is the null location, used for entities that have no
/// declaration site of their own (pointers, arrays, primitives).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CLocation {
    /// File name without directories.
    pub file_name: String,
    /// File path after directory remapping and shortening.
    pub file_path: String,
    /// 1-based line.
    pub line_number: u32,
    /// 1-based column.
    pub line_column: u32,
}

impl CLocation {
    /// The null location.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_null(&self) -> bool {
        self.file_path.is_empty() && self.file_name.is_empty()
    }
}

impl std::fmt::Display for CLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            return write!(f, "<no location>");
        }
        let path = if self.file_path.is_empty() {
            &self.file_name
        } else {
            &self.file_path
        };
        write!(f, "{}:{}:{}", path, self.line_number, self.line_column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_location() {
        let loc = CLocation::none();
        assert!(loc.is_null());
        assert_eq!(loc.to_string(), "<no location>");
    }

    #[test]
    fn display_prefers_path() {
        let loc = CLocation {
            file_name: "foo.h".into(),
            file_path: "include/foo.h".into(),
            line_number: 12,
            line_column: 3,
        };
        assert!(!loc.is_null());
        assert_eq!(loc.to_string(), "include/foo.h:12:3");
    }
}
