//! Exploration of parsed C translation units into a [`c2ast_core`] AST.
//!
//! The explorer walks a parser's cursor and type graph breadth-first, one
//! category at a time (macros, variables, functions, types), decides the
//! canonical kind of every type it reaches, names anonymous constructs, and
//! finishes each distinct name exactly once.
//!
//! ## Modules
//!
//! - [`clang`]: The parser capability seam
//! - [`memory`]: Arena-backed translation units and their builder
//! - [`config`]: `c2ast.toml` explorer configuration
//! - [`platform`]: Target platform of a parsed unit
//! - [`location`]: Portable source locations
//! - [`classify`]: Canonical kind of a type expression
//! - [`factory`]: Naming, layout and type descriptions
//! - [`session`]: Frontiers, visited sets and type visiting
//! - [`handlers`]: One finished node per kind
//! - [`assemble`]: Collection into the AST snapshot
//! - [`explorer`]: The run driver
//! - [`diagnostic`]: Recoverable conditions

pub mod assemble;
pub mod classify;
pub mod clang;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod explorer;
pub mod factory;
pub mod handlers;
pub mod info;
pub mod location;
pub mod memory;
pub mod platform;
pub mod session;

pub use clang::{CallingConv, ClangTranslationUnit, CursorKind, Linkage, TypeKind};
pub use config::{ExploreConfig, ExplorerOptions, LinkedPath};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{ExploreError, Result};
pub use explorer::{ExploreOutput, Explorer};
pub use memory::{MemoryTranslationUnit, MemoryTranslationUnitBuilder};
