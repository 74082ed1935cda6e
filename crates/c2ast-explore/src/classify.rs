//! Type classification.
//!
//! [`classify`] rewrites any parser type toward the handle that represents
//! it from then on, and decides its [`CKind`]. Typedefs keep their own
//! handle (the alias is the thing being named); attributed, elaborated and
//! unexposed wrappers are peeled away.

use c2ast_core::CKind;

use crate::clang::{ClangTranslationUnit, CursorKind, TypeKind, LAYOUT_INCOMPLETE};
use crate::error::{ExploreError, Result};

const MAX_DEPTH: usize = 64;

/// Semantic kind of `ty` and the canonical handle to use for it.
pub fn classify<T: ClangTranslationUnit>(unit: &T, ty: T::Type) -> Result<(CKind, T::Type)> {
    classify_at(unit, ty, 0)
}

/// The modified type of an attributed type, or `ty` itself.
pub fn unwrap_attributed<T: ClangTranslationUnit>(unit: &T, ty: T::Type) -> T::Type {
    if unit.type_kind(ty) == TypeKind::Attributed {
        unit.modified_type(ty)
    } else {
        ty
    }
}

fn classify_at<T: ClangTranslationUnit>(
    unit: &T,
    ty: T::Type,
    depth: usize,
) -> Result<(CKind, T::Type)> {
    if depth > MAX_DEPTH {
        return Err(ExploreError::InvalidUnit {
            detail: format!("type '{}' does not resolve", unit.type_spelling(ty)),
        });
    }

    let declaration = unit.type_declaration(ty);
    let declaration_kind = unit.cursor_kind(declaration);
    let ty = if declaration_kind == CursorKind::NoDeclFound {
        ty
    } else {
        let declared = unit.cursor_type(declaration);
        if unit.type_kind(declared) == TypeKind::Invalid {
            ty
        } else {
            declared
        }
    };

    let kind = unit.type_kind(ty);
    if kind.is_primitive() {
        return Ok((CKind::Primitive, ty));
    }

    match kind {
        TypeKind::Enum => Ok((CKind::Enum, ty)),
        TypeKind::Record => {
            if unit.size_of(ty) == LAYOUT_INCOMPLETE {
                Ok((CKind::OpaqueType, ty))
            } else if declaration_kind == CursorKind::UnionDecl {
                Ok((CKind::Union, ty))
            } else {
                Ok((CKind::Struct, ty))
            }
        }
        TypeKind::Typedef => {
            let underlying = unit.typedef_underlying_type(declaration);
            if unit.type_kind(underlying) == TypeKind::Pointer {
                return Ok((CKind::TypeAlias, ty));
            }
            // `void`, incomplete arrays and forward-declared records have no layout.
            let (underlying_kind, resolved) = classify_at(unit, underlying, depth + 1)?;
            if underlying_kind == CKind::OpaqueType || unit.size_of(resolved) == LAYOUT_INCOMPLETE {
                Ok((CKind::OpaqueType, ty))
            } else {
                Ok((CKind::TypeAlias, ty))
            }
        }
        TypeKind::FunctionProto | TypeKind::FunctionNoProto => Ok((CKind::Function, ty)),
        TypeKind::Pointer => {
            let pointee = unwrap_attributed(unit, unit.pointee_type(ty));
            let pointee_kind = unit.type_kind(pointee);
            let canonical_kind = unit.type_kind(unit.canonical_type(pointee));
            if pointee_kind.is_function() || canonical_kind.is_function() {
                Ok((CKind::FunctionPointer, ty))
            } else {
                Ok((CKind::Pointer, ty))
            }
        }
        TypeKind::Attributed => classify_at(unit, unit.modified_type(ty), depth + 1),
        TypeKind::Elaborated => classify_at(unit, unit.named_type(ty), depth + 1),
        TypeKind::ConstantArray | TypeKind::IncompleteArray => Ok((CKind::Array, ty)),
        TypeKind::Unexposed => {
            let canonical = unit.canonical_type(ty);
            if canonical == ty {
                return Err(ExploreError::UnknownTypeKind {
                    kind,
                    spelling: unit.type_spelling(ty),
                });
            }
            classify_at(unit, canonical, depth + 1)
        }
        _ => Err(ExploreError::UnknownTypeKind {
            kind,
            spelling: unit.type_spelling(ty),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryTranslationUnit, MemoryTranslationUnitBuilder, TypeId};

    fn builder() -> MemoryTranslationUnitBuilder {
        MemoryTranslationUnitBuilder::new("t.h", "x86_64-unknown-linux-gnu", 64)
    }

    fn kind_of(unit: &MemoryTranslationUnit, ty: TypeId) -> CKind {
        classify(unit, ty).unwrap().0
    }

    #[test]
    fn basic_kinds() {
        let mut b = builder();
        let int = b.int();
        let ptr = b.pointer(int);
        let array = b.constant_array(int, 3);
        let open = b.incomplete_array(int);
        let s = b.struct_type("S", &[("a", int)]);
        let u = b.union_type("U", &[("a", int)]);
        let e = b.enum_type("E", &[("A", 0)]);
        let f = b.function_proto(int, &[int], false);
        let unit = b.build();

        assert_eq!(kind_of(&unit, int), CKind::Primitive);
        assert_eq!(kind_of(&unit, ptr), CKind::Pointer);
        assert_eq!(kind_of(&unit, array), CKind::Array);
        assert_eq!(kind_of(&unit, open), CKind::Array);
        assert_eq!(kind_of(&unit, s), CKind::Struct);
        assert_eq!(kind_of(&unit, u), CKind::Union);
        assert_eq!(kind_of(&unit, e), CKind::Enum);
        assert_eq!(kind_of(&unit, f), CKind::Function);
    }

    #[test]
    fn wrappers_are_peeled() {
        let mut b = builder();
        let int = b.int();
        let s = b.struct_type("S", &[("a", int)]);
        let elaborated = b.elaborated(s);
        let attributed = b.attributed(elaborated);
        let unexposed = b.unexposed(s);
        let unit = b.build();

        assert_eq!(classify(&unit, elaborated).unwrap(), (CKind::Struct, s));
        assert_eq!(classify(&unit, attributed).unwrap(), (CKind::Struct, s));
        assert_eq!(classify(&unit, unexposed).unwrap(), (CKind::Struct, s));
    }

    #[test]
    fn forward_declared_record_is_opaque() {
        let mut b = builder();
        let s = b.forward_struct("Handle");
        let alias = b.typedef("Handle", s);
        let unit = b.build();

        assert_eq!(kind_of(&unit, s), CKind::OpaqueType);
        assert_eq!(kind_of(&unit, alias), CKind::OpaqueType);
    }

    #[test]
    fn typedef_without_layout_is_opaque() {
        let mut b = builder();
        let void = b.void();
        let int = b.int();
        let handle = b.typedef("handle_t", void);
        let tail = b.incomplete_array(int);
        let flexible = b.typedef("tail_t", tail);
        let unit = b.build();

        assert_eq!(classify(&unit, handle).unwrap(), (CKind::OpaqueType, handle));
        assert_eq!(classify(&unit, flexible).unwrap(), (CKind::OpaqueType, flexible));
    }

    #[test]
    fn pointer_typedef_is_never_opaque() {
        let mut b = builder();
        let s = b.forward_struct("Impl");
        let ptr = b.pointer(s);
        let alias = b.typedef("ImplRef", ptr);
        let unit = b.build();

        assert_eq!(classify(&unit, alias).unwrap(), (CKind::TypeAlias, alias));
    }

    #[test]
    fn pointer_to_function_is_function_pointer() {
        let mut b = builder();
        let int = b.int();
        let f = b.function_proto(int, &[int], false);
        let attributed = b.attributed(f);
        let direct = b.pointer(f);
        let through_attribute = b.pointer(attributed);
        let fn_alias = b.typedef("callback_fn", f);
        let through_alias = b.pointer(fn_alias);
        let unit = b.build();

        assert_eq!(kind_of(&unit, direct), CKind::FunctionPointer);
        assert_eq!(kind_of(&unit, through_attribute), CKind::FunctionPointer);
        assert_eq!(kind_of(&unit, through_alias), CKind::FunctionPointer);
    }

    #[test]
    fn classification_is_idempotent() {
        let mut b = builder();
        let int = b.int();
        let s = b.struct_type("S", &[("a", int)]);
        let elaborated = b.elaborated(s);
        let alias = b.typedef("S_t", elaborated);
        let attributed = b.attributed(alias);
        let unexposed = b.unexposed(attributed);
        let ptr = b.pointer(alias);
        let forward = b.forward_struct("F");
        let unit = b.build();

        for ty in [int, s, elaborated, alias, attributed, unexposed, ptr, forward] {
            let first = classify(&unit, ty).unwrap();
            let second = classify(&unit, first.1).unwrap();
            assert_eq!(first, second, "type {ty:?}");
            assert_eq!(first, classify(&unit, ty).unwrap());
        }
    }

    #[test]
    fn unknown_kinds_are_fatal() {
        let mut b = builder();
        let int = b.int();
        let unexposed_self = b.unexposed(int);
        let mut unit = b.build();
        unit.types[unexposed_self.0 as usize].canonical = Some(unexposed_self);
        unit.types[int.0 as usize].kind = TypeKind::Vector;

        assert!(matches!(
            classify(&unit, unexposed_self),
            Err(ExploreError::UnknownTypeKind { kind: TypeKind::Unexposed, .. })
        ));
        assert!(matches!(
            classify(&unit, int),
            Err(ExploreError::UnknownTypeKind { kind: TypeKind::Vector, .. })
        ));
    }
}
