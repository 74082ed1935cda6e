//! Per-occurrence type descriptions.
//!
//! A [`CTypeInfo`] describes one *use* of a type (a parameter, a field, a
//! return value), not its declaration. Pointers own the description of their
//! pointee and arrays the description of their element, so the structure is
//! a shallow tree with no back-edges even when the declarations it measures
//! are cyclic.

use serde::{Deserialize, Serialize};

use crate::kind::CKind;
use crate::location::CLocation;

/// Normalized description of one occurrence of a C type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CTypeInfo {
    /// Resolved type name.
    pub name: String,
    /// Semantic kind.
    pub kind: CKind,
    /// Size in bytes. Negative values are the parser's "unknown" sentinels
    /// and only survive for types reachable through error paths.
    pub size_of: i64,
    /// Alignment in bytes, when the parser knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align_of: Option<i64>,
    /// Size of one element in bytes (arrays only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_size: Option<i64>,
    /// Element count (fixed-size arrays only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_size_of: Option<i64>,
    /// Declaration site of the named type, if it has one.
    #[serde(default, skip_serializing_if = "CLocation::is_null")]
    pub location: CLocation,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_anonymous: bool,
    /// Pointee for pointers, element for arrays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_type: Option<Box<CTypeInfo>>,
}

impl CTypeInfo {
    /// A minimal occurrence with only name, kind and size set.
    pub fn new(name: impl Into<String>, kind: CKind, size_of: i64) -> Self {
        Self {
            name: name.into(),
            kind,
            size_of,
            align_of: None,
            element_size: None,
            array_size_of: None,
            location: CLocation::none(),
            is_anonymous: false,
            inner_type: None,
        }
    }

    /// Number of pointer/array levels above the innermost type.
    pub fn indirection_depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Some(inner) = &current.inner_type {
            depth += 1;
            current = inner;
        }
        depth
    }

    /// The innermost non-pointer, non-array type of this occurrence.
    pub fn innermost(&self) -> &CTypeInfo {
        let mut current = self;
        while let Some(inner) = &current.inner_type {
            current = inner;
        }
        current
    }
}

impl std::fmt::Display for CTypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
