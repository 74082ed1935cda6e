//! The AST snapshot.
//!
//! Every category is a name-keyed ordered map, so iteration order and the
//! JSON form depend only on the names, never on discovery order.

use std::collections::BTreeMap;
use std::path::Path;

use c2ast_targets::TargetPlatform;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::node::{
    CEnum, CFunction, CFunctionPointer, CMacroObject, COpaqueType, CRecord, CTypeAlias, CVariable,
};

/// Immutable, fully resolved description of one translation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CAbstractSyntaxTree {
    /// Path of the translation unit's main file.
    pub file_name: String,
    /// Platform the caller asked to target.
    pub platform_requested: TargetPlatform,
    /// Platform the parser resolved.
    pub platform_actual: TargetPlatform,
    #[serde(default)]
    pub macro_objects: BTreeMap<String, CMacroObject>,
    #[serde(default)]
    pub variables: BTreeMap<String, CVariable>,
    #[serde(default)]
    pub functions: BTreeMap<String, CFunction>,
    #[serde(default)]
    pub records: BTreeMap<String, CRecord>,
    #[serde(default)]
    pub enums: BTreeMap<String, CEnum>,
    #[serde(default)]
    pub type_aliases: BTreeMap<String, CTypeAlias>,
    #[serde(default)]
    pub opaque_types: BTreeMap<String, COpaqueType>,
    #[serde(default)]
    pub function_pointers: BTreeMap<String, CFunctionPointer>,
}

impl CAbstractSyntaxTree {
    /// An empty snapshot for the given file and platforms.
    pub fn empty(
        file_name: impl Into<String>,
        platform_requested: TargetPlatform,
        platform_actual: TargetPlatform,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            platform_requested,
            platform_actual,
            macro_objects: BTreeMap::new(),
            variables: BTreeMap::new(),
            functions: BTreeMap::new(),
            records: BTreeMap::new(),
            enums: BTreeMap::new(),
            type_aliases: BTreeMap::new(),
            opaque_types: BTreeMap::new(),
            function_pointers: BTreeMap::new(),
        }
    }

    /// Whether the parser resolved a different platform than requested.
    pub fn is_platform_mismatch(&self) -> bool {
        self.platform_requested != self.platform_actual
    }

    /// Total number of nodes across all categories.
    pub fn node_count(&self) -> usize {
        self.macro_objects.len()
            + self.variables.len()
            + self.functions.len()
            + self.records.len()
            + self.enums.len()
            + self.type_aliases.len()
            + self.opaque_types.len()
            + self.function_pointers.len()
    }

    /// Whether any type category (records, enums, aliases, opaque types,
    /// function pointers) holds `name`.
    pub fn contains_type(&self, name: &str) -> bool {
        self.records.contains_key(name)
            || self.enums.contains_key(name)
            || self.type_aliases.contains_key(name)
            || self.opaque_types.contains_key(name)
            || self.function_pointers.contains_key(name)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Write the snapshot as pretty JSON.
    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load a snapshot previously written with [`CAbstractSyntaxTree::write`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::CKind;
    use crate::location::CLocation;
    use crate::type_info::CTypeInfo;

    fn sample() -> CAbstractSyntaxTree {
        let mut ast = CAbstractSyntaxTree::empty(
            "main.h",
            TargetPlatform::x86_64_linux_gnu(),
            TargetPlatform::x86_64_linux_gnu(),
        );
        ast.type_aliases.insert(
            "handle_t".into(),
            CTypeAlias {
                name: "handle_t".into(),
                location: CLocation {
                    file_name: "main.h".into(),
                    file_path: "main.h".into(),
                    line_number: 3,
                    line_column: 13,
                },
                underlying_type: CTypeInfo::new("int", CKind::Primitive, 4),
            },
        );
        ast
    }

    #[test]
    fn counts_and_lookup() {
        let ast = sample();
        assert_eq!(ast.node_count(), 1);
        assert!(ast.contains_type("handle_t"));
        assert!(!ast.contains_type("missing"));
        assert!(!ast.is_platform_mismatch());
    }

    #[test]
    fn file_round_trip() {
        let ast = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ast.json");
        ast.write(&path).unwrap();
        let loaded = CAbstractSyntaxTree::load(&path).unwrap();
        assert_eq!(loaded, ast);
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = CAbstractSyntaxTree::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().starts_with("I/O error"));
    }
}
