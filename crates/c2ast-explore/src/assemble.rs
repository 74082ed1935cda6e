//! Collection of finished nodes into the AST snapshot.

use std::collections::BTreeMap;

use c2ast_core::{CAbstractSyntaxTree, CNode};
use c2ast_targets::TargetPlatform;
use tracing::{debug, warn};

use crate::diagnostic::Diagnostic;

/// Accumulates finished nodes into name-keyed maps. The first node under a
/// name wins; later ones are reported and dropped.
#[derive(Debug)]
pub struct AstAssembler {
    ast: CAbstractSyntaxTree,
    diagnostics: Vec<Diagnostic>,
    unmapped: usize,
}

fn insert_first<V>(map: &mut BTreeMap<String, V>, name: &str, value: V) -> bool {
    if map.contains_key(name) {
        return false;
    }
    map.insert(name.to_string(), value);
    true
}

impl AstAssembler {
    pub fn new(
        file_name: impl Into<String>,
        platform_requested: TargetPlatform,
        platform_actual: TargetPlatform,
    ) -> Self {
        Self {
            ast: CAbstractSyntaxTree::empty(file_name, platform_requested, platform_actual),
            diagnostics: Vec::new(),
            unmapped: 0,
        }
    }

    /// Add a finished node. Pointers, arrays and primitives are described
    /// inline wherever they occur and have no mapping of their own.
    pub fn add(&mut self, node: CNode) {
        let kind = node.kind();
        let name = node.name().to_string();
        let location = node.location().clone();

        let ast = &mut self.ast;
        let inserted = match node {
            CNode::MacroObject(n) => insert_first(&mut ast.macro_objects, &name, n),
            CNode::Variable(n) => insert_first(&mut ast.variables, &name, n),
            CNode::Function(n) => insert_first(&mut ast.functions, &name, n),
            CNode::Record(n) => insert_first(&mut ast.records, &name, n),
            CNode::Enum(n) => insert_first(&mut ast.enums, &name, n),
            CNode::TypeAlias(n) => insert_first(&mut ast.type_aliases, &name, n),
            CNode::OpaqueType(n) => insert_first(&mut ast.opaque_types, &name, n),
            CNode::FunctionPointer(n) => insert_first(&mut ast.function_pointers, &name, n),
            CNode::Pointer(_) | CNode::Array(_) | CNode::Primitive(_) => {
                debug!(%kind, %name, "described inline");
                self.unmapped += 1;
                return;
            }
        };

        if !inserted {
            warn!(%kind, %name, %location, "duplicate node dropped");
            self.diagnostics
                .push(Diagnostic::duplicate_node(kind, &name, &location));
        }
    }

    /// Number of pointer, array and primitive nodes seen.
    pub fn unmapped_count(&self) -> usize {
        self.unmapped
    }

    pub fn finish(self) -> (CAbstractSyntaxTree, Vec<Diagnostic>) {
        (self.ast, self.diagnostics)
    }
}
