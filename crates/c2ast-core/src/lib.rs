//! Normalized C abstract syntax tree model.
//!
//! This is the contract between the explorer, which builds it from a parsed
//! translation unit, and the binding generators, which consume it without
//! ever touching the C parser again.
//!
//! ## Modules
//!
//! - [`kind`]: Semantic kinds of C declarations and types
//! - [`location`]: Portable source locations
//! - [`type_info`]: Per-occurrence type descriptions
//! - [`node`]: Finished, immutable AST nodes
//! - [`ast`]: The name-keyed AST snapshot and its JSON form

pub mod ast;
pub mod error;
pub mod kind;
pub mod location;
pub mod node;
pub mod type_info;

pub use ast::CAbstractSyntaxTree;
pub use error::AstError;
pub use kind::CKind;
pub use location::CLocation;
pub use node::{
    CArray, CEnum, CEnumValue, CFunction, CFunctionCallingConvention, CFunctionParameter,
    CFunctionPointer, CFunctionPointerParameter, CMacroObject, CNode, COpaqueType, CPointer,
    CPrimitive, CRecord, CRecordField, CRecordKind, CTypeAlias, CVariable,
};
pub use type_info::CTypeInfo;
