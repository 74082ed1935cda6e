//! The C parser capability seam.
//!
//! The explorer never talks to a concrete parser. It consumes the queries of
//! [`ClangTranslationUnit`], which mirror the subset of libclang's cursor and
//! type interface the exploration needs. Handles are plain `Copy` values that
//! are only meaningful while the translation unit that produced them is
//! alive; the explorer copies everything it needs into owned data before it
//! returns.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Size/alignment sentinel: the type is invalid.
pub const LAYOUT_INVALID: i64 = -1;
/// Size/alignment sentinel: the type is incomplete (forward declared only).
pub const LAYOUT_INCOMPLETE: i64 = -2;
/// Size/alignment sentinel: the type is dependent.
pub const LAYOUT_DEPENDENT: i64 = -3;
/// Size/alignment sentinel: the type does not have a constant size.
pub const LAYOUT_NOT_CONSTANT_SIZE: i64 = -5;

/// Kind of a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorKind {
    TranslationUnit,
    FunctionDecl,
    VarDecl,
    ParmDecl,
    FieldDecl,
    StructDecl,
    UnionDecl,
    EnumDecl,
    EnumConstantDecl,
    TypedefDecl,
    MacroDefinition,
    MacroExpansion,
    InclusionDirective,
    /// Returned by declaration lookups that have no declaration.
    NoDeclFound,
    /// Any cursor kind the explorer has no use for.
    Other,
}

/// Kind of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Invalid,
    Unexposed,
    Void,
    Bool,
    CharU,
    UChar,
    Char16,
    Char32,
    UShort,
    UInt,
    ULong,
    ULongLong,
    UInt128,
    CharS,
    SChar,
    WChar,
    Short,
    Int,
    Long,
    LongLong,
    Int128,
    Half,
    Float16,
    Float,
    Double,
    LongDouble,
    Float128,
    Pointer,
    BlockPointer,
    Record,
    Enum,
    Typedef,
    FunctionNoProto,
    FunctionProto,
    ConstantArray,
    IncompleteArray,
    VariableArray,
    Vector,
    Complex,
    Elaborated,
    Attributed,
}

impl TypeKind {
    /// Built-in C types.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            TypeKind::Void
                | TypeKind::Bool
                | TypeKind::CharU
                | TypeKind::UChar
                | TypeKind::Char16
                | TypeKind::Char32
                | TypeKind::UShort
                | TypeKind::UInt
                | TypeKind::ULong
                | TypeKind::ULongLong
                | TypeKind::UInt128
                | TypeKind::CharS
                | TypeKind::SChar
                | TypeKind::WChar
                | TypeKind::Short
                | TypeKind::Int
                | TypeKind::Long
                | TypeKind::LongLong
                | TypeKind::Int128
                | TypeKind::Half
                | TypeKind::Float16
                | TypeKind::Float
                | TypeKind::Double
                | TypeKind::LongDouble
                | TypeKind::Float128
        )
    }

    pub fn is_function(self) -> bool {
        matches!(self, TypeKind::FunctionProto | TypeKind::FunctionNoProto)
    }

    /// Constant or incomplete array.
    pub fn is_array(self) -> bool {
        matches!(self, TypeKind::ConstantArray | TypeKind::IncompleteArray)
    }
}

/// Linkage of a declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Linkage {
    Invalid,
    #[default]
    NoLinkage,
    Internal,
    UniqueExternal,
    External,
}

/// Calling convention attached to a function type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallingConv {
    #[default]
    C,
    X86StdCall,
    X86FastCall,
    X86ThisCall,
    X86VectorCall,
    X86_64SysV,
    X86_64Win64,
    Aapcs,
    AapcsVfp,
    Invalid,
    Unexposed,
}

/// Resolved file position of a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileLocation {
    /// Backing file; `None` for built-in or command-line entities.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
    #[serde(default)]
    pub is_in_system_header: bool,
}

/// What the parser resolved as the compilation target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetInfo {
    pub triple: String,
    pub pointer_width: u32,
}

/// Queries a parsed C translation unit must answer.
pub trait ClangTranslationUnit {
    /// Cursor handle.
    type Cursor: Copy + Eq + std::hash::Hash + std::fmt::Debug;
    /// Type handle.
    type Type: Copy + Eq + std::hash::Hash + std::fmt::Debug;

    /// Path of the main file.
    fn spelling(&self) -> String;

    fn target_info(&self) -> Result<TargetInfo>;

    /// The translation-unit cursor.
    fn root_cursor(&self) -> Self::Cursor;

    /// Direct children of `cursor` accepted by `filter`, in source order.
    fn children(
        &self,
        cursor: Self::Cursor,
        filter: &mut dyn FnMut(Self::Cursor) -> bool,
    ) -> Vec<Self::Cursor>;

    fn cursor_kind(&self, cursor: Self::Cursor) -> CursorKind;
    fn cursor_spelling(&self, cursor: Self::Cursor) -> String;
    fn cursor_type(&self, cursor: Self::Cursor) -> Self::Type;
    fn cursor_linkage(&self, cursor: Self::Cursor) -> Linkage;
    fn cursor_is_anonymous(&self, cursor: Self::Cursor) -> bool;
    fn cursor_location(&self, cursor: Self::Cursor) -> FileLocation;

    fn is_macro_builtin(&self, cursor: Self::Cursor) -> bool;
    fn is_macro_function_like(&self, cursor: Self::Cursor) -> bool;
    /// Replacement-list tokens of a macro definition (the name excluded).
    fn macro_tokens(&self, cursor: Self::Cursor) -> Vec<String>;

    fn typedef_underlying_type(&self, cursor: Self::Cursor) -> Self::Type;
    /// Offset of a field in bits, or a negative sentinel.
    fn field_offset_bits(&self, cursor: Self::Cursor) -> i64;
    fn enum_constant_value(&self, cursor: Self::Cursor) -> i64;
    fn enum_integer_type(&self, cursor: Self::Cursor) -> Self::Type;

    fn type_kind(&self, ty: Self::Type) -> TypeKind;
    fn type_spelling(&self, ty: Self::Type) -> String;
    /// Declaring cursor, or a [`CursorKind::NoDeclFound`] cursor.
    fn type_declaration(&self, ty: Self::Type) -> Self::Cursor;
    fn canonical_type(&self, ty: Self::Type) -> Self::Type;
    /// Type wrapped by an attributed type.
    fn modified_type(&self, ty: Self::Type) -> Self::Type;
    /// Type named by an elaborated type.
    fn named_type(&self, ty: Self::Type) -> Self::Type;
    fn pointee_type(&self, ty: Self::Type) -> Self::Type;
    fn element_type(&self, ty: Self::Type) -> Self::Type;
    fn result_type(&self, ty: Self::Type) -> Self::Type;
    fn argument_types(&self, ty: Self::Type) -> Vec<Self::Type>;
    fn is_function_variadic(&self, ty: Self::Type) -> bool;
    fn calling_convention(&self, ty: Self::Type) -> CallingConv;
    /// Field cursors of a record type, anonymous members included.
    fn record_fields(&self, ty: Self::Type) -> Vec<Self::Cursor>;

    /// Size in bytes or one of the `LAYOUT_*` sentinels.
    fn size_of(&self, ty: Self::Type) -> i64;
    /// Alignment in bytes or one of the `LAYOUT_*` sentinels.
    fn align_of(&self, ty: Self::Type) -> i64;
    /// Element count of a constant array, `-1` otherwise.
    fn array_size(&self, ty: Self::Type) -> i64;

    /// Direct children of `cursor` with the given kind.
    fn children_of_kind(&self, cursor: Self::Cursor, kind: CursorKind) -> Vec<Self::Cursor> {
        self.children(cursor, &mut |child| self.cursor_kind(child) == kind)
    }
}
