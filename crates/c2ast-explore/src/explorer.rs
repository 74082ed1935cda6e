//! The exploration driver.
//!
//! [`Explorer::explore`] scans the top level of a translation unit, drains
//! macros and variables, then alternates between functions and types until
//! every frontier is empty, and assembles the result.

use c2ast_core::CAbstractSyntaxTree;
use tracing::{debug, error, info, warn};

use crate::assemble::AstAssembler;
use crate::clang::ClangTranslationUnit;
use crate::config::ExploreConfig;
use crate::diagnostic::Diagnostic;
use crate::error::Result;
use crate::factory::NodeFactory;
use crate::handlers;
use crate::location::LocationResolver;
use crate::platform::resolve_platform;
use crate::session::{Category, ExploreSession};

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploreOutput {
    pub ast: CAbstractSyntaxTree,
    pub diagnostics: Vec<Diagnostic>,
}

/// Explores translation units with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Explorer {
    config: ExploreConfig,
}

impl Explorer {
    pub fn new(config: ExploreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExploreConfig {
        &self.config
    }

    /// Explore `unit` into an AST. Any fatal condition aborts the whole run.
    pub fn explore<T: ClangTranslationUnit>(&self, unit: &T) -> Result<ExploreOutput> {
        match self.run(unit) {
            Ok(output) => {
                debug!(
                    nodes = output.ast.node_count(),
                    diagnostics = output.diagnostics.len(),
                    "exploration succeeded"
                );
                Ok(output)
            }
            Err(e) => {
                error!(error = %e, file = %unit.spelling(), "exploration failed");
                Err(e)
            }
        }
    }

    fn run<T: ClangTranslationUnit>(&self, unit: &T) -> Result<ExploreOutput> {
        let requested = self.config.requested_platform()?;
        let (actual, pointer_width) = resolve_platform(unit)?;
        if requested != actual {
            warn!(
                requested = %requested,
                actual = %actual,
                "parsed platform differs from the requested platform"
            );
        }

        let file_name = unit.spelling();
        let locations = LocationResolver::new(file_name.clone(), &self.config);
        let factory = NodeFactory::new(unit, locations, pointer_width);
        let mut session = ExploreSession::new(factory, &self.config.explorer);
        let mut assembler = AstAssembler::new(file_name, requested, actual);

        session.scan_top_level()?;

        drain(&mut session, &mut assembler, Category::Macros)?;
        drain(&mut session, &mut assembler, Category::Variables)?;
        while !session.is_exhausted() {
            drain(&mut session, &mut assembler, Category::Functions)?;
            drain(&mut session, &mut assembler, Category::Types)?;
        }

        let mut diagnostics = session.into_diagnostics();
        let (ast, assembler_diagnostics) = assembler.finish();
        diagnostics.extend(assembler_diagnostics);

        Ok(ExploreOutput { ast, diagnostics })
    }
}

/// Finish everything queued in `category`, including whatever gets queued
/// there while doing so.
fn drain<T: ClangTranslationUnit>(
    session: &mut ExploreSession<'_, T>,
    assembler: &mut AstAssembler,
    category: Category,
) -> Result<()> {
    loop {
        let batch = session.take(category);
        if batch.is_empty() {
            return Ok(());
        }

        let names: Vec<&str> = batch.iter().map(|n| n.name.as_str()).collect();
        info!("Exploring {} {}: {}", batch.len(), category, names.join(", "));

        let mut found = Vec::with_capacity(batch.len());
        for info in batch {
            let node = handlers::handle(session, info)?;
            info!(kind = %node.kind(), name = %node.name(), location = %node.location(), "found");
            found.push(node.name().to_string());
            assembler.add(node);
        }
        info!("Found {} {}: {}", found.len(), category, found.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use c2ast_core::{CFunctionCallingConvention, CKind, CRecordKind};

    use crate::clang::{CallingConv, TypeKind};
    use crate::diagnostic::Severity;
    use crate::error::ExploreError;
    use crate::memory::{MemoryTranslationUnit, MemoryTranslationUnitBuilder};

    const TRIPLE: &str = "x86_64-unknown-linux-gnu";

    fn builder() -> MemoryTranslationUnitBuilder {
        MemoryTranslationUnitBuilder::new("api.h", TRIPLE, 64)
    }

    fn explore(unit: &MemoryTranslationUnit) -> ExploreOutput {
        Explorer::default().explore(unit).unwrap()
    }

    #[test]
    fn functions_pull_in_their_types() {
        let mut b = builder();
        let int = b.int();
        let double = b.primitive(TypeKind::Double);
        let point = b.struct_type("Point", &[("x", double), ("y", double)]);
        let elaborated = b.elaborated(point);
        let ptr = b.pointer(elaborated);
        b.function("point_length", double, &[("p", ptr)]);
        b.variadic_function("log_printf", int, &[("level", int)]);
        let output = explore(&b.build());
        let ast = output.ast;

        let length = &ast.functions["point_length"];
        assert_eq!(length.calling_convention, CFunctionCallingConvention::Cdecl);
        assert_eq!(length.return_type.name, "double");
        assert_eq!(length.parameters[0].name, "p");
        assert_eq!(length.parameters[0].type_info.name, "Point *");
        assert_eq!(length.parameters[0].type_info.kind, CKind::Pointer);
        assert_eq!(length.parameters[0].type_info.innermost().name, "Point");
        assert!(!length.is_variadic);
        assert!(ast.functions["log_printf"].is_variadic);

        let record = &ast.records["Point"];
        assert_eq!(record.record_kind, CRecordKind::Struct);
        assert_eq!(record.size_of, 16);
        assert_eq!(record.fields[1].offset_of, 8);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn same_type_through_two_paths_is_finished_once() {
        let mut b = builder();
        let int = b.int();
        let foo = b.struct_type("Foo", &[("a", int)]);
        let bar = b.struct_type("Bar", &[("foo", foo), ("again", foo)]);
        b.function("make_foo", foo, &[]);
        b.function("use_bar", int, &[("bar", bar)]);
        let ast = explore(&b.build()).ast;

        assert_eq!(ast.records.len(), 2);
        assert_eq!(ast.records["Bar"].fields[0].type_info.name, "Foo");
        assert_eq!(ast.records["Bar"].fields[1].offset_of, 4);
    }

    #[test]
    fn output_is_deterministic() {
        let build = || {
            let mut b = builder();
            let int = b.int();
            let e = b.enum_type("Mode", &[("A", 0), ("B", 1)]);
            let inner = b.struct_type("Inner", &[("mode", e)]);
            let outer = b.struct_type("Outer", &[("inner", inner), ("count", int)]);
            let ptr = b.pointer(outer);
            b.macro_object("LIMIT", &["16"]);
            let void = b.void();
            b.function("create", ptr, &[]);
            b.function("destroy", void, &[("outer", ptr)]);
            b.build()
        };

        let first = explore(&build()).ast.to_json().unwrap();
        let second = explore(&build()).ast.to_json().unwrap();
        assert_eq!(first, second);
        assert!(first.contains("\"Outer\""));
    }

    #[test]
    fn opaque_override_takes_precedence() {
        let mut b = builder();
        let int = b.int();
        let handle = b.struct_type("Handle", &[("fd", int)]);
        let ptr = b.pointer(handle);
        b.function("open_handle", ptr, &[]);
        b.function("handle_fd", int, &[("handle", handle)]);
        let unit = b.build();

        let mut config = ExploreConfig::default();
        config.explorer.opaque_types.insert("Handle".to_string());
        let ast = Explorer::new(config).explore(&unit).unwrap().ast;

        assert!(ast.opaque_types.contains_key("Handle"));
        assert!(!ast.records.contains_key("Handle"));
        assert_eq!(
            ast.functions["handle_fd"].parameters[0].type_info.kind,
            CKind::OpaqueType
        );
    }

    #[test]
    fn typedef_of_anonymous_struct_is_one_struct() {
        let mut b = builder();
        let float = b.primitive(TypeKind::Float);
        let vec2 = b.typedef_struct("Vec2", &[("x", float), ("y", float)]);
        b.function("vec2_dot", float, &[("a", vec2), ("b", vec2)]);
        let ast = explore(&b.build()).ast;

        assert_eq!(ast.records.len(), 1);
        assert_eq!(ast.records["Vec2"].size_of, 8);
        assert!(ast.type_aliases.is_empty());
        assert_eq!(ast.functions["vec2_dot"].parameters[1].type_info.kind, CKind::Struct);
    }

    #[test]
    fn pointer_typedef_is_an_alias_even_to_incomplete_types() {
        let mut b = builder();
        let imp = b.forward_struct("Impl");
        let ptr = b.pointer(imp);
        let alias = b.typedef("ImplRef", ptr);
        b.function("impl_create", alias, &[]);
        let ast = explore(&b.build()).ast;

        let alias = &ast.type_aliases["ImplRef"];
        assert_eq!(alias.underlying_type.kind, CKind::Pointer);
        assert_eq!(alias.underlying_type.size_of, 8);
        assert!(ast.opaque_types.contains_key("Impl"));
        assert_eq!(ast.opaque_types["Impl"].size_of, 0);
    }

    #[test]
    fn void_typedef_is_opaque() {
        let mut b = builder();
        let void = b.void();
        let handle = b.typedef("handle_t", void);
        let ptr = b.pointer(handle);
        b.function("handle_open", ptr, &[]);
        let ast = explore(&b.build()).ast;

        assert!(ast.opaque_types.contains_key("handle_t"));
        assert!(!ast.type_aliases.contains_key("handle_t"));
    }

    #[test]
    fn anonymous_union_member_is_named_after_its_position() {
        let mut b = builder();
        let int = b.int();
        let float = b.primitive(TypeKind::Float);
        let anonymous = b.anonymous_union(&[("i", int), ("f", float)]);
        let foo = b.struct_type("Foo", &[("tag", int), ("", anonymous)]);
        b.function("foo_get", int, &[("foo", foo)]);
        let ast = explore(&b.build()).ast;

        let foo = &ast.records["Foo"];
        assert_eq!(foo.fields[1].type_info.name, "Foo_ANONYMOUS_FIELD1");
        assert!(foo.fields[1].type_info.is_anonymous);
        let member = &ast.records["Foo_ANONYMOUS_FIELD1"];
        assert_eq!(member.record_kind, CRecordKind::Union);
        assert_eq!(member.fields.len(), 2);
    }

    #[test]
    fn anonymous_enum_field_is_named_after_its_position() {
        let mut b = builder();
        let int = b.int();
        let mode = b.anonymous_enum(&[("MODE_READ", 0), ("MODE_WRITE", 1)]);
        let msg = b.struct_type("Msg", &[("tag", int), ("mode", mode)]);
        b.function("msg_send", int, &[("msg", msg)]);
        let ast = explore(&b.build()).ast;

        let msg = &ast.records["Msg"];
        assert_eq!(msg.fields[1].type_info.name, "Msg_ANONYMOUS_FIELD1");
        assert_eq!(msg.fields[1].type_info.kind, CKind::Enum);
        let mode = &ast.enums["Msg_ANONYMOUS_FIELD1"];
        assert_eq!(mode.values.len(), 2);
        assert_eq!(mode.values[1].name, "MODE_WRITE");
    }

    #[test]
    fn file_scope_anonymous_enum_is_skipped() {
        let mut b = builder();
        let int = b.int();
        b.top_level_anonymous_enum(&[("LIMIT", 16)]);
        b.function("limit", int, &[]);
        let output = explore(&b.build());

        assert!(output.ast.enums.is_empty());
        assert!(output.ast.functions.contains_key("limit"));
    }

    #[test]
    fn fixed_array_field_carries_sizes() {
        let mut b = builder();
        let int = b.int();
        let values = b.constant_array(int, 4);
        let bar = b.struct_type("Bar", &[("values", values)]);
        b.function("bar_sum", int, &[("bar", bar)]);
        let ast = explore(&b.build()).ast;

        let field = &ast.records["Bar"].fields[0].type_info;
        assert_eq!(field.kind, CKind::Array);
        assert_eq!(field.name, "int[4]");
        assert_eq!(field.array_size_of, Some(4));
        assert_eq!(field.element_size, Some(4));
        assert_eq!(field.size_of, 16);
    }

    #[test]
    fn pointer_to_system_struct_is_excluded() {
        let mut b = builder();
        b.in_file("/usr/include/stdio.h").system_header(true);
        let int = b.int();
        let file = b.forward_struct("_IO_FILE");
        b.function("fclose", int, &[]);
        b.in_file("api.h").system_header(false);
        let ptr = b.pointer(file);
        b.function("write_report", int, &[("stream", ptr)]);
        let ast = explore(&b.build()).ast;

        assert!(ast.functions.contains_key("write_report"));
        assert!(!ast.functions.contains_key("fclose"));
        assert!(!ast.contains_type("_IO_FILE"));
        assert_eq!(
            ast.functions["write_report"].parameters[0].type_info.name,
            "_IO_FILE *"
        );
    }

    #[test]
    fn filter_applies_to_the_flattened_name() {
        let mut b = builder();
        let int = b.int();
        let user = b.struct_type("Config", &[("flags", int)]);
        b.in_file("/usr/include/sys/config.h").system_header(true);
        let system_alias = b.typedef("sys_config_t", user);
        let system_struct = b.struct_type("timespec", &[("tv_sec", int)]);
        b.in_file("api.h").system_header(false);
        let user_alias = b.typedef("Timespec", system_struct);
        b.function("apply", int, &[("config", system_alias), ("when", user_alias)]);
        let ast = explore(&b.build()).ast;

        assert!(ast.records.contains_key("Config"));
        assert!(!ast.records.contains_key("timespec"));
        assert!(ast.type_aliases.is_empty());
        let parameters = &ast.functions["apply"].parameters;
        assert_eq!(parameters[0].type_info.name, "Config");
        assert_eq!(parameters[1].type_info.name, "timespec");
    }

    #[test]
    fn self_referential_struct_terminates() {
        let mut b = builder();
        let int = b.int();
        let node = b.forward_struct("Node");
        let next = b.pointer(node);
        b.define_record(node, &[("value", int), ("next", next)]);
        b.function("list_head", next, &[]);
        let ast = explore(&b.build()).ast;

        assert_eq!(ast.records.len(), 1);
        let node = &ast.records["Node"];
        assert_eq!(node.fields[1].type_info.name, "Node *");
        assert_eq!(node.size_of, 16);
        assert!(ast.opaque_types.is_empty());
    }

    #[test]
    fn macros_carry_values_and_types() {
        let mut b = builder();
        b.macro_object("VERSION_MAJOR", &["2"]);
        b.macro_object("NAME", &["\"c2ast\""]);
        b.macro_object("MASK", &["(", "1", "<<", "4", ")"]);
        b.macro_object("VERSION_MAJOR", &["3"]);
        b.function_like_macro("MAX", &["a"]);
        let output = explore(&b.build());
        let macros = &output.ast.macro_objects;

        assert_eq!(macros.len(), 3);
        assert_eq!(macros["VERSION_MAJOR"].value, "2");
        assert_eq!(macros["VERSION_MAJOR"].type_name.as_deref(), Some("int"));
        assert_eq!(macros["NAME"].type_name.as_deref(), Some("const char*"));
        assert_eq!(macros["MASK"].value, "(1 << 4)");
        assert_eq!(macros["MASK"].type_name, None);
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].severity, Severity::Warning);
        assert!(output.diagnostics[0].summary.contains("api.h:4:1"));
    }

    #[test]
    fn enums_record_integer_type_and_values() {
        let mut b = builder();
        let int = b.int();
        b.enum_type("Dangling", &[("D", 1)]);
        let e = b.enum_type("Status", &[("ERROR", -1), ("OK", 0)]);
        b.function("status", e, &[("code", int)]);
        let unit = b.build();

        let ast = explore(&unit).ast;
        assert!(ast.enums.contains_key("Dangling"));
        let status = &ast.enums["Status"];
        assert_eq!(status.integer_type.name, "int");
        assert_eq!(status.values[0].name, "ERROR");
        assert_eq!(status.values[0].value, -1);
        assert_eq!(status.size_of, 4);

        let mut config = ExploreConfig::default();
        config.explorer.enums_dangling = false;
        let ast = Explorer::new(config).explore(&unit).unwrap().ast;
        assert!(!ast.enums.contains_key("Dangling"));
        assert!(ast.enums.contains_key("Status"));
    }

    #[test]
    fn function_pointer_typedef() {
        let mut b = builder();
        let int = b.int();
        let void = b.void();
        let data = b.pointer(void);
        let signature = b.function_proto_with(int, &[int, data], false, CallingConv::X86StdCall);
        let ptr = b.pointer(signature);
        let callback = b.typedef("callback_t", ptr);
        b.function("register_callback", void, &[("cb", callback), ("user", data)]);
        let ast = explore(&b.build()).ast;

        let callback = &ast.function_pointers["callback_t"];
        assert_eq!(callback.size_of, 8);
        assert_eq!(callback.calling_convention, CFunctionCallingConvention::StdCall);
        assert_eq!(callback.return_type.name, "int");
        assert_eq!(callback.parameters.len(), 2);
        assert_eq!(callback.parameters[1].type_info.name, "void *");
        assert!(!callback.location.is_null());
        assert!(ast.type_aliases.is_empty());
    }

    #[test]
    fn primitive_typedef_stays_an_alias() {
        let mut b = builder();
        let uint = b.primitive(TypeKind::UInt);
        let alias = b.typedef("u32", uint);
        b.function("crc32", alias, &[]);
        let ast = explore(&b.build()).ast;

        let alias = &ast.type_aliases["u32"];
        assert_eq!(alias.underlying_type.name, "unsigned int");
        assert_eq!(alias.underlying_type.kind, CKind::Primitive);
        assert_eq!(ast.functions["crc32"].return_type.kind, CKind::TypeAlias);
    }

    #[test]
    fn variables_are_described_but_not_explored() {
        let mut b = builder();
        let int = b.int();
        let settings = b.struct_type("Settings", &[("level", int)]);
        b.variable("global_settings", settings);
        b.variable("counter", int);
        let ast = explore(&b.build()).ast;

        assert_eq!(ast.variables.len(), 2);
        assert_eq!(ast.variables["global_settings"].type_info.name, "Settings");
        assert_eq!(ast.variables["global_settings"].type_info.size_of, 4);
        assert!(ast.variables["counter"].location.is_null());
        assert!(!ast.variables["global_settings"].location.is_null());
        assert!(ast.records.is_empty());
    }

    #[test]
    fn redeclared_function_is_reported() {
        let mut b = builder();
        let int = b.int();
        b.function("f", int, &[]);
        b.function("f", int, &[]);
        let output = explore(&b.build());

        assert_eq!(output.ast.functions.len(), 1);
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].severity, Severity::Info);
    }

    #[test]
    fn platform_mismatch_is_kept() {
        let unit = builder().build();
        let mut config = ExploreConfig::default();
        config.target = "aarch64-apple-darwin".to_string();
        let ast = Explorer::new(config).explore(&unit).unwrap().ast;

        assert!(ast.is_platform_mismatch());
        assert_eq!(ast.platform_requested.triple(), "aarch64-apple-darwin");
        assert_eq!(ast.platform_actual.triple(), TRIPLE);
    }

    #[test]
    fn unknown_type_kind_aborts_the_run() {
        let mut b = builder();
        let int = b.int();
        let f = b.function("f", int, &[]);
        let mut unit = b.build();
        let return_type = unit.result_type(unit.cursor_type(f));
        unit.types[return_type.0 as usize].kind = TypeKind::Complex;

        let err = Explorer::default().explore(&unit).unwrap_err();
        assert!(matches!(
            err,
            ExploreError::UnknownTypeKind { kind: TypeKind::Complex, .. }
        ));
    }
}
