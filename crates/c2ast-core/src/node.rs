//! Finished AST nodes.
//!
//! One struct per semantic kind, closed under the [`CNode`] enum. Nodes refer
//! to each other only by name (through [`CTypeInfo::name`]), never by
//! embedding, so cyclic C declarations produce no cyclic ownership here.
//! Equality is structural.

use serde::{Deserialize, Serialize};

use crate::kind::CKind;
use crate::location::CLocation;
use crate::type_info::CTypeInfo;

/// Calling convention of a function or function pointer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CFunctionCallingConvention {
    #[default]
    Cdecl,
    StdCall,
    FastCall,
    ThisCall,
    VectorCall,
    SysV64,
    Win64,
    Aapcs,
    /// A convention the parser reported that has no host-side meaning here.
    Unknown,
}

/// An object-like macro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CMacroObject {
    pub name: String,
    pub location: CLocation,
    /// Replacement-list tokens, in order.
    pub tokens: Vec<String>,
    /// Normalized replacement text.
    pub value: String,
    /// C type of the value when it is a simple constant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

/// A global variable with external linkage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CVariable {
    pub name: String,
    pub location: CLocation,
    pub type_info: CTypeInfo,
}

/// A named function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CFunctionParameter {
    pub name: String,
    pub location: CLocation,
    pub type_info: CTypeInfo,
}

/// A function declaration with external linkage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CFunction {
    pub name: String,
    pub location: CLocation,
    pub calling_convention: CFunctionCallingConvention,
    pub return_type: CTypeInfo,
    pub parameters: Vec<CFunctionParameter>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_variadic: bool,
}

/// Struct or union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CRecordKind {
    Struct,
    Union,
}

/// A field of a struct or union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CRecordField {
    /// Field name; empty for anonymous members.
    pub name: String,
    pub location: CLocation,
    pub type_info: CTypeInfo,
    /// Byte offset from the start of the record.
    pub offset_of: i64,
}

/// A struct or union with a complete definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CRecord {
    pub record_kind: CRecordKind,
    pub name: String,
    pub location: CLocation,
    pub size_of: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align_of: Option<i64>,
    pub fields: Vec<CRecordField>,
}

/// One enumerator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CEnumValue {
    pub name: String,
    pub value: i64,
}

/// An enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CEnum {
    pub name: String,
    pub location: CLocation,
    pub size_of: i64,
    pub integer_type: CTypeInfo,
    pub values: Vec<CEnumValue>,
}

/// A typedef that is kept as an alias (its target is not a record, enum or
/// function pointer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CTypeAlias {
    pub name: String,
    pub location: CLocation,
    pub underlying_type: CTypeInfo,
}

/// A type known only by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct COpaqueType {
    pub name: String,
    pub location: CLocation,
    /// Always 0 for forward declarations.
    pub size_of: i64,
}

/// A parameter of a function pointer; C function types carry no names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CFunctionPointerParameter {
    pub name: String,
    pub type_info: CTypeInfo,
}

/// A pointer-to-function type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CFunctionPointer {
    pub name: String,
    pub location: CLocation,
    pub size_of: i64,
    pub calling_convention: CFunctionCallingConvention,
    pub return_type: CTypeInfo,
    pub parameters: Vec<CFunctionPointerParameter>,
}

/// A data pointer type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CPointer {
    pub name: String,
    pub location: CLocation,
    pub size_of: i64,
    pub pointee: CTypeInfo,
}

/// A fixed or incomplete array type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CArray {
    pub name: String,
    pub location: CLocation,
    pub size_of: i64,
    pub element: CTypeInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_count: Option<i64>,
}

/// A built-in C type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CPrimitive {
    pub name: String,
    pub location: CLocation,
    pub size_of: i64,
}

/// A finished AST node of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CNode {
    MacroObject(CMacroObject),
    Variable(CVariable),
    Function(CFunction),
    Record(CRecord),
    Enum(CEnum),
    TypeAlias(CTypeAlias),
    OpaqueType(COpaqueType),
    FunctionPointer(CFunctionPointer),
    Pointer(CPointer),
    Array(CArray),
    Primitive(CPrimitive),
}

impl CNode {
    pub fn kind(&self) -> CKind {
        match self {
            CNode::MacroObject(_) => CKind::Macro,
            CNode::Variable(_) => CKind::Variable,
            CNode::Function(_) => CKind::Function,
            CNode::Record(r) => match r.record_kind {
                CRecordKind::Struct => CKind::Struct,
                CRecordKind::Union => CKind::Union,
            },
            CNode::Enum(_) => CKind::Enum,
            CNode::TypeAlias(_) => CKind::TypeAlias,
            CNode::OpaqueType(_) => CKind::OpaqueType,
            CNode::FunctionPointer(_) => CKind::FunctionPointer,
            CNode::Pointer(_) => CKind::Pointer,
            CNode::Array(_) => CKind::Array,
            CNode::Primitive(_) => CKind::Primitive,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CNode::MacroObject(n) => &n.name,
            CNode::Variable(n) => &n.name,
            CNode::Function(n) => &n.name,
            CNode::Record(n) => &n.name,
            CNode::Enum(n) => &n.name,
            CNode::TypeAlias(n) => &n.name,
            CNode::OpaqueType(n) => &n.name,
            CNode::FunctionPointer(n) => &n.name,
            CNode::Pointer(n) => &n.name,
            CNode::Array(n) => &n.name,
            CNode::Primitive(n) => &n.name,
        }
    }

    pub fn location(&self) -> &CLocation {
        match self {
            CNode::MacroObject(n) => &n.location,
            CNode::Variable(n) => &n.location,
            CNode::Function(n) => &n.location,
            CNode::Record(n) => &n.location,
            CNode::Enum(n) => &n.location,
            CNode::TypeAlias(n) => &n.location,
            CNode::OpaqueType(n) => &n.location,
            CNode::FunctionPointer(n) => &n.location,
            CNode::Pointer(n) => &n.location,
            CNode::Array(n) => &n.location,
            CNode::Primitive(n) => &n.location,
        }
    }

    /// Size in bytes, for kinds that have one.
    pub fn size_of(&self) -> Option<i64> {
        match self {
            CNode::MacroObject(_) | CNode::Function(_) => None,
            CNode::Variable(n) => Some(n.type_info.size_of),
            CNode::Record(n) => Some(n.size_of),
            CNode::Enum(n) => Some(n.size_of),
            CNode::TypeAlias(n) => Some(n.underlying_type.size_of),
            CNode::OpaqueType(n) => Some(n.size_of),
            CNode::FunctionPointer(n) => Some(n.size_of),
            CNode::Pointer(n) => Some(n.size_of),
            CNode::Array(n) => Some(n.size_of),
            CNode::Primitive(n) => Some(n.size_of),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> CTypeInfo {
        CTypeInfo::new("int", CKind::Primitive, 4)
    }

    #[test]
    fn record_kind_maps_to_ckind() {
        let mut record = CRecord {
            record_kind: CRecordKind::Struct,
            name: "Foo".into(),
            location: CLocation::none(),
            size_of: 4,
            align_of: Some(4),
            fields: vec![CRecordField {
                name: "a".into(),
                location: CLocation::none(),
                type_info: int(),
                offset_of: 0,
            }],
        };
        assert_eq!(CNode::Record(record.clone()).kind(), CKind::Struct);
        record.record_kind = CRecordKind::Union;
        let node = CNode::Record(record);
        assert_eq!(node.kind(), CKind::Union);
        assert_eq!(node.name(), "Foo");
        assert_eq!(node.size_of(), Some(4));
    }

    #[test]
    fn structural_equality() {
        let a = CFunction {
            name: "f".into(),
            location: CLocation::none(),
            calling_convention: CFunctionCallingConvention::Cdecl,
            return_type: int(),
            parameters: vec![],
            is_variadic: false,
        };
        let mut b = a.clone();
        assert_eq!(CNode::Function(a.clone()), CNode::Function(b.clone()));
        b.parameters.push(CFunctionParameter {
            name: "x".into(),
            location: CLocation::none(),
            type_info: int(),
        });
        assert_ne!(CNode::Function(a), CNode::Function(b));
    }

    #[test]
    fn functions_and_macros_have_no_size() {
        let m = CNode::MacroObject(CMacroObject {
            name: "ONE".into(),
            location: CLocation::none(),
            tokens: vec!["1".into()],
            value: "1".into(),
            type_name: Some("int".into()),
        });
        assert_eq!(m.size_of(), None);
        assert_eq!(m.kind(), CKind::Macro);
    }
}
