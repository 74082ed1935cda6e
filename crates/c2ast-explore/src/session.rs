//! The exploration session: frontier queues and the visited-set gate.
//!
//! One [`ExploreSession`] owns all mutable state of a run. Handlers receive
//! it by `&mut` and grow the type graph only through
//! [`ExploreSession::visit_type`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use c2ast_core::{CKind, CTypeInfo};
use tracing::debug;

use crate::classify::classify;
use crate::clang::{ClangTranslationUnit, CursorKind, Linkage, TypeKind};
use crate::config::ExplorerOptions;
use crate::diagnostic::Diagnostic;
use crate::error::Result;
use crate::factory::{strip_tag_keywords, NodeFactory};
use crate::info::ExploreInfoNode;

/// Visit record type for a given translation unit type.
pub type InfoNode<T> =
    ExploreInfoNode<<T as ClangTranslationUnit>::Cursor, <T as ClangTranslationUnit>::Type>;

/// The four frontier queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Macros,
    Variables,
    Functions,
    Types,
}

impl Category {
    pub fn of(kind: CKind) -> Self {
        match kind {
            CKind::Macro => Category::Macros,
            CKind::Variable => Category::Variables,
            CKind::Function => Category::Functions,
            _ => Category::Types,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Macros => "macros",
            Category::Variables => "variables",
            Category::Functions => "functions",
            Category::Types => "types",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug)]
struct Frontier<N> {
    queue: VecDeque<N>,
    visited: HashSet<String>,
}

impl<N> Default for Frontier<N> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            visited: HashSet::new(),
        }
    }
}

/// Outcome of offering a node to the visited-set gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Accepted,
    Duplicate,
    Filtered,
}

/// Mutable state of one exploration run.
pub struct ExploreSession<'a, T: ClangTranslationUnit> {
    factory: NodeFactory<'a, T>,
    options: &'a ExplorerOptions,
    macros: Frontier<InfoNode<T>>,
    variables: Frontier<InfoNode<T>>,
    functions: Frontier<InfoNode<T>>,
    types: Frontier<InfoNode<T>>,
    /// Replacement tokens of the first definition of each macro.
    macro_tokens: HashMap<String, Vec<String>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a, T: ClangTranslationUnit> ExploreSession<'a, T> {
    pub fn new(factory: NodeFactory<'a, T>, options: &'a ExplorerOptions) -> Self {
        Self {
            factory,
            options,
            macros: Frontier::default(),
            variables: Frontier::default(),
            functions: Frontier::default(),
            types: Frontier::default(),
            macro_tokens: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn unit(&self) -> &'a T {
        self.factory.unit()
    }

    pub fn factory(&self) -> &NodeFactory<'a, T> {
        &self.factory
    }

    pub fn options(&self) -> &'a ExplorerOptions {
        self.options
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn frontier(&mut self, category: Category) -> &mut Frontier<InfoNode<T>> {
        match category {
            Category::Macros => &mut self.macros,
            Category::Variables => &mut self.variables,
            Category::Functions => &mut self.functions,
            Category::Types => &mut self.types,
        }
    }

    /// Remove and return everything currently queued in `category`.
    pub fn take(&mut self, category: Category) -> Vec<InfoNode<T>> {
        self.frontier(category).queue.drain(..).collect()
    }

    pub fn is_queued(&self, category: Category) -> bool {
        let frontier = match category {
            Category::Macros => &self.macros,
            Category::Variables => &self.variables,
            Category::Functions => &self.functions,
            Category::Types => &self.types,
        };
        !frontier.queue.is_empty()
    }

    /// Whether every frontier is empty.
    pub fn is_exhausted(&self) -> bool {
        [
            Category::Macros,
            Category::Variables,
            Category::Functions,
            Category::Types,
        ]
        .iter()
        .all(|c| !self.is_queued(*c))
    }

    /// Whether `name` has already been offered in `category`.
    pub fn is_visited(&self, category: Category, name: &str) -> bool {
        let frontier = match category {
            Category::Macros => &self.macros,
            Category::Variables => &self.variables,
            Category::Functions => &self.functions,
            Category::Types => &self.types,
        };
        frontier.visited.contains(name)
    }

    /// Offer a node to its frontier. Returns whether it was queued.
    pub fn try_enqueue(&mut self, info: InfoNode<T>) -> bool {
        let category = Category::of(info.kind);
        let enabled = match category {
            Category::Macros => self.options.macro_objects,
            Category::Variables => self.options.variables,
            Category::Functions => self.options.functions,
            Category::Types => true,
        };
        if !enabled {
            return false;
        }

        match self.can_enqueue(category, &info) {
            Gate::Accepted => {
                debug!(kind = %info.kind, name = %info.name, location = %info.location, "enqueued");
                self.frontier(category).queue.push_back(info);
                true
            }
            Gate::Duplicate => {
                let diagnostic = match category {
                    Category::Macros if self.is_macro_redefinition(&info) => {
                        Some(Diagnostic::macro_already_exists(&info.name, &info.location))
                    }
                    Category::Macros => None,
                    Category::Variables | Category::Functions => Some(Diagnostic::redeclared(
                        info.kind,
                        &info.name,
                        &info.location,
                    )),
                    Category::Types => None,
                };
                self.diagnostics.extend(diagnostic);
                false
            }
            Gate::Filtered => false,
        }
    }

    fn can_enqueue(&mut self, category: Category, info: &InfoNode<T>) -> Gate {
        let key = info.visited_key().to_string();
        if !self.frontier(category).visited.insert(key) {
            return Gate::Duplicate;
        }
        if category == Category::Macros {
            let tokens = self.unit().macro_tokens(info.cursor);
            self.macro_tokens.insert(info.name.clone(), tokens);
        }

        let accepted = if category == Category::Types {
            self.accepts_type(info.cursor, info.ty)
        } else {
            self.accepts_declaration(info.cursor)
        };
        if accepted {
            Gate::Accepted
        } else {
            Gate::Filtered
        }
    }

    /// A repeated `#define` with the same replacement list is benign.
    fn is_macro_redefinition(&self, info: &InfoNode<T>) -> bool {
        let tokens = self.unit().macro_tokens(info.cursor);
        self.macro_tokens.get(&info.name) != Some(&tokens)
    }

    /// Pointers and arrays are judged by what they point to; everything
    /// else by where it is declared.
    fn accepts_type(&self, cursor: T::Cursor, ty: T::Type) -> bool {
        let unit = self.unit();
        let kind = unit.type_kind(ty);
        let inner = if kind == TypeKind::Pointer {
            unit.pointee_type(ty)
        } else if kind.is_array() {
            unit.element_type(ty)
        } else {
            return self.accepts_declaration(cursor);
        };

        let declaration = unit.type_declaration(inner);
        if unit.cursor_kind(declaration) == CursorKind::NoDeclFound {
            return true;
        }
        self.accepts_type(declaration, inner)
    }

    fn accepts_declaration(&self, cursor: T::Cursor) -> bool {
        self.options.system_declarations
            || !self.unit().cursor_location(cursor).is_in_system_header
    }

    /// Visit a type reference found at `field_index` inside `parent`: queue
    /// whatever it names and describe this occurrence of it.
    pub fn visit_type(
        &mut self,
        candidate: T::Type,
        parent: Option<&str>,
        field_index: usize,
    ) -> Result<CTypeInfo> {
        self.visit_type_as(candidate, parent, field_index, None)
    }

    fn visit_type_as(
        &mut self,
        candidate: T::Type,
        parent: Option<&str>,
        field_index: usize,
        alias: Option<T::Type>,
    ) -> Result<CTypeInfo> {
        let unit = self.unit();
        let (kind, ty) = classify(unit, candidate)?;
        let cursor = unit.type_declaration(ty);
        let name = unit.cursor_spelling(cursor);

        let mut info = self
            .factory
            .create_visit_info_node(kind, &name, cursor, ty, parent, field_index)?;

        if let (CKind::FunctionPointer, Some(alias)) = (kind, alias) {
            let alias_cursor = unit.type_declaration(alias);
            info.name = strip_tag_keywords(&unit.type_spelling(alias));
            info.type_name = info.name.clone();
            info.location = self.factory.location(alias_cursor, alias)?;
        }

        if self.options.is_opaque_override(&info.name)
            || self.options.is_opaque_override(&info.type_name)
        {
            info.kind = CKind::OpaqueType;
            let type_name = info.type_name.clone();
            self.try_enqueue(info);
            return self
                .factory
                .create_type(CKind::OpaqueType, &type_name, ty, candidate);
        }

        if kind == CKind::TypeAlias {
            let underlying = unit.typedef_underlying_type(cursor);
            let (underlying_kind, underlying) = classify(unit, underlying)?;
            if matches!(
                underlying_kind,
                CKind::Enum | CKind::Struct | CKind::Union | CKind::FunctionPointer
            ) {
                return self.visit_type_as(underlying, parent, field_index, Some(ty));
            }
        }

        let type_name = info.type_name.clone();
        if kind != CKind::Function {
            self.try_enqueue(info);
        }
        self.factory.create_type(kind, &type_name, ty, candidate)
    }

    /// Offer every top-level declaration of interest.
    pub fn scan_top_level(&mut self) -> Result<()> {
        let unit = self.unit();
        let root = unit.root_cursor();
        let cursors = unit.children(root, &mut |cursor| is_top_level_of_interest(unit, cursor));

        for cursor in cursors {
            self.visit_top_level(cursor)?;
        }
        Ok(())
    }

    fn visit_top_level(&mut self, cursor: T::Cursor) -> Result<()> {
        let unit = self.unit();
        let kind = match unit.cursor_kind(cursor) {
            CursorKind::FunctionDecl => CKind::Function,
            CursorKind::VarDecl => CKind::Variable,
            CursorKind::EnumDecl => CKind::Enum,
            CursorKind::MacroDefinition => CKind::Macro,
            _ => return Ok(()),
        };

        if kind == CKind::Macro && unit.is_macro_function_like(cursor) {
            return Ok(());
        }
        if kind == CKind::Enum && !self.options.enums_dangling {
            return Ok(());
        }
        if kind == CKind::Enum && unit.cursor_is_anonymous(cursor) {
            let spelling = unit.type_spelling(unit.cursor_type(cursor));
            debug!(%spelling, "skipped file-scope anonymous enum");
            return Ok(());
        }

        let mut ty = unit.cursor_type(cursor);
        if unit.type_kind(ty) == TypeKind::Unexposed {
            ty = unit.canonical_type(ty);
        }
        if unit.type_kind(ty) == TypeKind::Attributed {
            ty = unit.modified_type(ty);
        }

        let name = unit.cursor_spelling(cursor);
        let info = self
            .factory
            .create_visit_info_node(kind, &name, cursor, ty, None, 0)?;
        self.try_enqueue(info);
        Ok(())
    }
}

fn is_top_level_of_interest<T: ClangTranslationUnit>(unit: &T, cursor: T::Cursor) -> bool {
    match unit.cursor_kind(cursor) {
        CursorKind::MacroDefinition => !unit.is_macro_builtin(cursor),
        CursorKind::FunctionDecl | CursorKind::VarDecl | CursorKind::EnumDecl => {
            unit.cursor_linkage(cursor) == Linkage::External
        }
        _ => false,
    }
}
