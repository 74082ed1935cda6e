//! Pending-visit records.

use c2ast_core::{CKind, CLocation};

/// A declaration or type that was offered for exploration and is waiting in
/// a frontier queue. The parser handles it carries are only valid for the
/// current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploreInfoNode<C, Ty> {
    pub kind: CKind,
    /// Declaration name, or the type name when the declaration has none.
    pub name: String,
    /// Synthesized type name; empty for macros and functions.
    pub type_name: String,
    pub cursor: C,
    pub ty: Ty,
    /// Name of the node that discovered this one, for anonymous naming.
    pub parent_name: Option<String>,
    pub location: CLocation,
    pub size_of: i64,
    pub align_of: Option<i64>,
}

impl<C, Ty> ExploreInfoNode<C, Ty> {
    /// The name this node occupies in its category's visited set.
    pub fn visited_key(&self) -> &str {
        if self.kind.is_type() && !self.type_name.is_empty() {
            &self.type_name
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(kind: CKind, name: &str, type_name: &str) -> ExploreInfoNode<u32, u32> {
        ExploreInfoNode {
            kind,
            name: name.to_string(),
            type_name: type_name.to_string(),
            cursor: 0,
            ty: 0,
            parent_name: None,
            location: CLocation::none(),
            size_of: 0,
            align_of: None,
        }
    }

    #[test]
    fn declarations_are_keyed_by_name() {
        assert_eq!(node(CKind::Variable, "counter", "int").visited_key(), "counter");
        assert_eq!(node(CKind::Function, "f", "").visited_key(), "f");
    }

    #[test]
    fn types_are_keyed_by_type_name() {
        assert_eq!(node(CKind::Pointer, "", "int *").visited_key(), "int *");
        assert_eq!(node(CKind::Struct, "Foo", "Foo").visited_key(), "Foo");
    }
}
