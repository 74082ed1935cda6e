//! Semantic kinds.

use serde::{Deserialize, Serialize};

/// The semantic kind of a C declaration or type occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CKind {
    Macro,
    Variable,
    Function,
    Struct,
    Union,
    Enum,
    TypeAlias,
    OpaqueType,
    FunctionPointer,
    Pointer,
    Array,
    Primitive,
}

impl CKind {
    /// Kinds that are reached through type references rather than top-level
    /// declarations.
    pub fn is_type(self) -> bool {
        !matches!(self, CKind::Macro | CKind::Variable | CKind::Function)
    }

    /// Struct or union.
    pub fn is_record(self) -> bool {
        matches!(self, CKind::Struct | CKind::Union)
    }
}

impl std::fmt::Display for CKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CKind::Macro => "macro",
            CKind::Variable => "variable",
            CKind::Function => "function",
            CKind::Struct => "struct",
            CKind::Union => "union",
            CKind::Enum => "enum",
            CKind::TypeAlias => "type alias",
            CKind::OpaqueType => "opaque type",
            CKind::FunctionPointer => "function pointer",
            CKind::Pointer => "pointer",
            CKind::Array => "array",
            CKind::Primitive => "primitive",
        };
        write!(f, "{name}")
    }
}
