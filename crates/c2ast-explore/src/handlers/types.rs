//! Aliases, opaque types, function pointers, pointers, arrays and primitives.

use c2ast_core::{
    CArray, CFunctionPointer, CFunctionPointerParameter, CKind, CNode, COpaqueType, CPointer,
    CPrimitive, CTypeAlias,
};

use super::{calling_convention, handle};
use crate::classify::{classify, unwrap_attributed};
use crate::clang::ClangTranslationUnit;
use crate::error::Result;
use crate::session::{ExploreSession, InfoNode};

/// A typedef of a record, enum or function pointer is emitted as that kind
/// under the typedef's name.
pub(super) fn type_alias<T: ClangTranslationUnit>(
    session: &mut ExploreSession<'_, T>,
    info: InfoNode<T>,
) -> Result<CNode> {
    let unit = session.unit();
    let underlying = unit.typedef_underlying_type(info.cursor);
    let (underlying_kind, underlying_type) = classify(unit, underlying)?;

    if matches!(
        underlying_kind,
        CKind::Enum | CKind::Struct | CKind::Union | CKind::FunctionPointer
    ) {
        let mut flattened = session.factory().create_visit_info_node(
            underlying_kind,
            &info.name,
            unit.type_declaration(underlying_type),
            underlying_type,
            info.parent_name.as_deref(),
            0,
        )?;
        flattened.name = info.name;
        flattened.type_name = info.type_name;
        flattened.location = info.location;
        return handle(session, flattened);
    }

    let underlying_type = session.visit_type(underlying, Some(&info.name), 0)?;
    Ok(CNode::TypeAlias(CTypeAlias {
        name: info.name,
        location: info.location,
        underlying_type,
    }))
}

pub(super) fn opaque_type<T: ClangTranslationUnit>(
    _session: &mut ExploreSession<'_, T>,
    info: InfoNode<T>,
) -> Result<CNode> {
    Ok(CNode::OpaqueType(COpaqueType {
        name: info.name,
        location: info.location,
        size_of: info.size_of,
    }))
}

pub(super) fn function_pointer<T: ClangTranslationUnit>(
    session: &mut ExploreSession<'_, T>,
    info: InfoNode<T>,
) -> Result<CNode> {
    let unit = session.unit();
    let mut function = unwrap_attributed(unit, unit.pointee_type(info.ty));
    if !unit.type_kind(function).is_function() {
        function = unwrap_attributed(unit, unit.canonical_type(function));
    }

    let return_type = session.visit_type(unit.result_type(function), Some(&info.name), 0)?;
    let mut parameters = Vec::new();
    for (index, argument) in unit.argument_types(function).into_iter().enumerate() {
        parameters.push(CFunctionPointerParameter {
            name: String::new(),
            type_info: session.visit_type(argument, Some(&info.name), index)?,
        });
    }

    Ok(CNode::FunctionPointer(CFunctionPointer {
        name: info.name,
        location: info.location,
        size_of: info.size_of,
        calling_convention: calling_convention(unit.calling_convention(function)),
        return_type,
        parameters,
    }))
}

pub(super) fn pointer<T: ClangTranslationUnit>(
    session: &mut ExploreSession<'_, T>,
    info: InfoNode<T>,
) -> Result<CNode> {
    let unit = session.unit();
    let pointee = session.visit_type(unit.pointee_type(info.ty), Some(&info.name), 0)?;
    Ok(CNode::Pointer(CPointer {
        name: info.name,
        location: info.location,
        size_of: info.size_of,
        pointee,
    }))
}

pub(super) fn array<T: ClangTranslationUnit>(
    session: &mut ExploreSession<'_, T>,
    info: InfoNode<T>,
) -> Result<CNode> {
    let unit = session.unit();
    let element = session.visit_type(unit.element_type(info.ty), Some(&info.name), 0)?;
    let count = unit.array_size(info.ty);
    Ok(CNode::Array(CArray {
        name: info.name,
        location: info.location,
        size_of: info.size_of,
        element,
        element_count: (count >= 0).then_some(count),
    }))
}

pub(super) fn primitive<T: ClangTranslationUnit>(
    _session: &mut ExploreSession<'_, T>,
    info: InfoNode<T>,
) -> Result<CNode> {
    Ok(CNode::Primitive(CPrimitive {
        name: info.name,
        location: info.location,
        size_of: info.size_of,
    }))
}
