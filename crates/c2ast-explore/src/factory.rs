//! Construction of type occurrences and visit records.
//!
//! [`NodeFactory`] names types (synthesizing names for anonymous and unnamed
//! records), measures them, and turns parser handles into [`CTypeInfo`]s and
//! [`ExploreInfoNode`]s.

use c2ast_core::{CKind, CLocation, CTypeInfo};

use crate::classify::{classify, unwrap_attributed};
use crate::clang::{ClangTranslationUnit, CursorKind, TypeKind};
use crate::error::{ExploreError, Result};
use crate::info::ExploreInfoNode;
use crate::location::LocationResolver;

const TAG_KEYWORDS: [&str; 3] = ["struct", "union", "enum"];

/// Drop `struct`, `union` and `enum` keywords from a type spelling.
pub fn strip_tag_keywords(spelling: &str) -> String {
    spelling
        .split(' ')
        .filter(|word| !TAG_KEYWORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds [`CTypeInfo`]s and [`ExploreInfoNode`]s for one translation unit.
#[derive(Debug)]
pub struct NodeFactory<'a, T: ClangTranslationUnit> {
    unit: &'a T,
    locations: LocationResolver,
    pointer_size: i64,
}

impl<'a, T: ClangTranslationUnit> NodeFactory<'a, T> {
    pub fn new(unit: &'a T, locations: LocationResolver, pointer_width_bits: u32) -> Self {
        Self {
            unit,
            locations,
            pointer_size: i64::from(pointer_width_bits / 8),
        }
    }

    pub fn unit(&self) -> &'a T {
        self.unit
    }

    pub fn location(&self, cursor: T::Cursor, ty: T::Type) -> Result<CLocation> {
        self.locations.location(self.unit, cursor, ty)
    }

    /// Name a type as it occurs at `field_index` inside `parent`.
    pub fn type_name(
        &self,
        kind: CKind,
        ty: T::Type,
        parent: Option<&str>,
        field_index: usize,
    ) -> Result<String> {
        if matches!(kind, CKind::Macro | CKind::Function) {
            return Ok(String::new());
        }

        let unit = self.unit;
        let declaration = unit.type_declaration(ty);
        let declaration_kind = unit.cursor_kind(declaration);
        let parent = parent.unwrap_or_default();

        // Anonymous records and enums are only nameable through their parent.
        if unit.cursor_is_anonymous(declaration) {
            if parent.is_empty() {
                return Err(ExploreError::UnknownAnonymousCursor {
                    kind: declaration_kind,
                    spelling: unit.type_spelling(ty),
                });
            }
            return Ok(format!("{parent}_ANONYMOUS_FIELD{field_index}"));
        }

        let spelling = unit.type_spelling(ty);
        if spelling.contains("(unnamed at ") {
            return Ok(format!("{parent}_UNNAMED_FIELD{field_index}"));
        }

        let name = match unit.type_kind(ty) {
            TypeKind::ConstantArray => self.array_name(ty, Some(unit.array_size(ty))),
            TypeKind::IncompleteArray => self.array_name(ty, None),
            _ => strip_tag_keywords(&spelling),
        };

        if name.is_empty() {
            if matches!(
                declaration_kind,
                CursorKind::StructDecl | CursorKind::UnionDecl
            ) {
                return Ok(format!("{parent}_{}", unit.cursor_spelling(declaration)));
            }
            return Err(ExploreError::EmptyTypeName { spelling });
        }

        Ok(name)
    }

    fn array_name(&self, ty: T::Type, count: Option<i64>) -> String {
        let base = strip_tag_keywords(&self.unit.type_spelling(self.unit.element_type(ty)));
        let dimension = match count {
            Some(n) => format!("[{n}]"),
            None => "[]".to_string(),
        };
        match base.find('[') {
            Some(at) => format!("{}{}{}", &base[..at], dimension, &base[at..]),
            None => format!("{base}{dimension}"),
        }
    }

    /// Size of a type, with fallbacks for the parser's negative sentinels.
    pub fn size_of(&self, kind: CKind, ty: T::Type) -> i64 {
        let size = self.unit.size_of(ty);
        if size >= 0 {
            return size;
        }
        match kind {
            CKind::Primitive | CKind::OpaqueType => 0,
            CKind::Pointer | CKind::Array => self.pointer_size,
            _ => size,
        }
    }

    pub fn align_of(&self, ty: T::Type) -> Option<i64> {
        let align = self.unit.align_of(ty);
        (align >= 0).then_some(align)
    }

    /// Describe one occurrence of `ty`. Layout is measured on `container`,
    /// the handle as it appeared before classification.
    pub fn create_type(
        &self,
        kind: CKind,
        type_name: &str,
        ty: T::Type,
        container: T::Type,
    ) -> Result<CTypeInfo> {
        let unit = self.unit;
        let ty = unwrap_attributed(unit, ty);

        let array_size = unit.array_size(container);
        let element_size = if kind == CKind::Array {
            let (element_kind, element) = classify(unit, unit.element_type(ty))?;
            Some(self.size_of(element_kind, element))
        } else {
            None
        };

        let declaration = unit.type_declaration(ty);
        let location = self.location(declaration, ty)?;

        let inner_type = match kind {
            CKind::Pointer => Some(Box::new(self.create_inner(unit.pointee_type(ty))?)),
            CKind::Array => Some(Box::new(self.create_inner(unit.element_type(ty))?)),
            _ => None,
        };

        Ok(CTypeInfo {
            name: type_name.to_string(),
            kind,
            size_of: self.size_of(kind, container),
            align_of: self.align_of(container),
            element_size,
            array_size_of: (array_size >= 0).then_some(array_size),
            location,
            is_anonymous: unit.cursor_is_anonymous(declaration),
            inner_type,
        })
    }

    fn create_inner(&self, candidate: T::Type) -> Result<CTypeInfo> {
        let (kind, ty) = classify(self.unit, candidate)?;
        let name = strip_tag_keywords(&self.unit.type_spelling(ty));
        self.create_type(kind, &name, ty, candidate)
    }

    /// Build the pending-visit record for a declaration or type.
    pub fn create_visit_info_node(
        &self,
        kind: CKind,
        name: &str,
        cursor: T::Cursor,
        ty: T::Type,
        parent: Option<&str>,
        field_index: usize,
    ) -> Result<ExploreInfoNode<T::Cursor, T::Type>> {
        let type_name = self.type_name(kind, ty, parent, field_index)?;
        let name = if name.is_empty() {
            type_name.clone()
        } else {
            name.to_string()
        };

        Ok(ExploreInfoNode {
            kind,
            name,
            type_name,
            cursor,
            ty,
            parent_name: parent.map(str::to_string),
            location: self.location(cursor, ty)?,
            size_of: self.size_of(kind, ty),
            align_of: self.align_of(ty),
        })
    }
}
