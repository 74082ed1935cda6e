//! Structs, unions and enums.

use c2ast_core::{CEnum, CEnumValue, CKind, CNode, CRecord, CRecordField, CRecordKind};

use crate::clang::{ClangTranslationUnit, CursorKind};
use crate::error::Result;
use crate::session::{ExploreSession, InfoNode};

pub(super) fn record<T: ClangTranslationUnit>(
    session: &mut ExploreSession<'_, T>,
    info: InfoNode<T>,
) -> Result<CNode> {
    let unit = session.unit();
    let record_kind = if info.kind == CKind::Union {
        CRecordKind::Union
    } else {
        CRecordKind::Struct
    };

    let cursors = unit.record_fields(info.ty);
    let mut fields = Vec::with_capacity(cursors.len());
    for (index, field) in cursors.into_iter().enumerate() {
        let field_type = unit.cursor_type(field);
        let type_info = session.visit_type(field_type, Some(&info.name), index)?;
        fields.push(CRecordField {
            name: unit.cursor_spelling(field),
            location: session.factory().location(field, field_type)?,
            type_info,
            offset_of: unit.field_offset_bits(field).max(0) / 8,
        });
    }

    Ok(CNode::Record(CRecord {
        record_kind,
        name: info.name,
        location: info.location,
        size_of: info.size_of,
        align_of: info.align_of,
        fields,
    }))
}

pub(super) fn enumeration<T: ClangTranslationUnit>(
    session: &mut ExploreSession<'_, T>,
    info: InfoNode<T>,
) -> Result<CNode> {
    let unit = session.unit();
    let integer_type = session.visit_type(unit.enum_integer_type(info.cursor), Some(&info.name), 0)?;

    let values = unit
        .children_of_kind(info.cursor, CursorKind::EnumConstantDecl)
        .into_iter()
        .map(|constant| CEnumValue {
            name: unit.cursor_spelling(constant),
            value: unit.enum_constant_value(constant),
        })
        .collect();

    Ok(CNode::Enum(CEnum {
        name: info.name,
        location: info.location,
        size_of: info.size_of,
        integer_type,
        values,
    }))
}
