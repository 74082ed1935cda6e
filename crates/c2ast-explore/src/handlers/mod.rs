//! Per-kind handlers turning visit records into finished nodes.
//!
//! Each handler consumes one [`InfoNode`] and returns exactly one [`CNode`],
//! visiting whatever types the node refers to along the way.

mod declarations;
mod records;
mod types;

use c2ast_core::{CFunctionCallingConvention, CKind, CNode};

use crate::clang::{CallingConv, ClangTranslationUnit};
use crate::error::Result;
use crate::session::{ExploreSession, InfoNode};

pub use declarations::{infer_macro_type, macro_value};

/// Finish `info` with the handler for its kind.
pub fn handle<T: ClangTranslationUnit>(
    session: &mut ExploreSession<'_, T>,
    info: InfoNode<T>,
) -> Result<CNode> {
    match info.kind {
        CKind::Macro => declarations::macro_object(session, info),
        CKind::Variable => declarations::variable(session, info),
        CKind::Function => declarations::function(session, info),
        CKind::Struct | CKind::Union => records::record(session, info),
        CKind::Enum => records::enumeration(session, info),
        CKind::TypeAlias => types::type_alias(session, info),
        CKind::OpaqueType => types::opaque_type(session, info),
        CKind::FunctionPointer => types::function_pointer(session, info),
        CKind::Pointer => types::pointer(session, info),
        CKind::Array => types::array(session, info),
        CKind::Primitive => types::primitive(session, info),
    }
}

pub(crate) fn calling_convention(convention: CallingConv) -> CFunctionCallingConvention {
    match convention {
        CallingConv::C => CFunctionCallingConvention::Cdecl,
        CallingConv::X86StdCall => CFunctionCallingConvention::StdCall,
        CallingConv::X86FastCall => CFunctionCallingConvention::FastCall,
        CallingConv::X86ThisCall => CFunctionCallingConvention::ThisCall,
        CallingConv::X86VectorCall => CFunctionCallingConvention::VectorCall,
        CallingConv::X86_64SysV => CFunctionCallingConvention::SysV64,
        CallingConv::X86_64Win64 => CFunctionCallingConvention::Win64,
        CallingConv::Aapcs | CallingConv::AapcsVfp => CFunctionCallingConvention::Aapcs,
        CallingConv::Invalid | CallingConv::Unexposed => CFunctionCallingConvention::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExploreConfig;
    use crate::factory::NodeFactory;
    use crate::location::LocationResolver;
    use crate::memory::{MemoryTranslationUnit, MemoryTranslationUnitBuilder};

    fn session<'a>(
        unit: &'a MemoryTranslationUnit,
        config: &'a ExploreConfig,
    ) -> ExploreSession<'a, MemoryTranslationUnit> {
        let locations = LocationResolver::new(unit.spelling(), config);
        ExploreSession::new(NodeFactory::new(unit, locations, 64), &config.explorer)
    }

    #[test]
    fn calling_conventions_map() {
        assert_eq!(calling_convention(CallingConv::C), CFunctionCallingConvention::Cdecl);
        assert_eq!(
            calling_convention(CallingConv::X86StdCall),
            CFunctionCallingConvention::StdCall
        );
        assert_eq!(
            calling_convention(CallingConv::AapcsVfp),
            CFunctionCallingConvention::Aapcs
        );
        assert_eq!(
            calling_convention(CallingConv::Unexposed),
            CFunctionCallingConvention::Unknown
        );
    }

    #[test]
    fn record_typedef_finishes_as_the_record() {
        let mut b = MemoryTranslationUnitBuilder::new("t.h", "x86_64-unknown-linux-gnu", 64);
        let int = b.int();
        let alias = b.typedef_struct("Vec2", &[("x", int), ("y", int)]);
        let unit = b.build();
        let config = ExploreConfig::default();
        let mut session = session(&unit, &config);

        let cursor = unit.type_declaration(alias);
        let info = session
            .factory()
            .create_visit_info_node(CKind::TypeAlias, "Vec2", cursor, alias, None, 0)
            .unwrap();
        let location = info.location.clone();

        match handle(&mut session, info).unwrap() {
            CNode::Record(record) => {
                assert_eq!(record.name, "Vec2");
                assert_eq!(record.size_of, 8);
                assert_eq!(record.fields.len(), 2);
                assert_eq!(record.location, location);
            }
            other => panic!("expected a record, got {other:?}"),
        }
    }

    #[test]
    fn pointer_typedef_finishes_as_an_alias() {
        let mut b = MemoryTranslationUnitBuilder::new("t.h", "x86_64-unknown-linux-gnu", 64);
        let int = b.int();
        let ptr = b.pointer(int);
        let alias = b.typedef("int_ptr", ptr);
        let unit = b.build();
        let config = ExploreConfig::default();
        let mut session = session(&unit, &config);

        let cursor = unit.type_declaration(alias);
        let info = session
            .factory()
            .create_visit_info_node(CKind::TypeAlias, "int_ptr", cursor, alias, None, 0)
            .unwrap();

        match handle(&mut session, info).unwrap() {
            CNode::TypeAlias(alias) => {
                assert_eq!(alias.underlying_type.kind, CKind::Pointer);
                assert_eq!(alias.underlying_type.name, "int *");
            }
            other => panic!("expected an alias, got {other:?}"),
        }
    }
}
