//! Recoverable conditions reported alongside the AST.

use std::fmt;

use c2ast_core::{CKind, CLocation};
use serde::{Deserialize, Serialize};

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// Something the run noticed and dropped without failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
}

impl Diagnostic {
    /// An object-like macro defined a second time.
    pub fn macro_already_exists(name: &str, location: &CLocation) -> Self {
        Self {
            severity: Severity::Warning,
            summary: format!(
                "The object-like macro '{}' at {}:{}:{} already previously exists.",
                name, location.file_path, location.line_number, location.line_column
            ),
        }
    }

    /// A function or variable declared again after its first declaration.
    pub fn redeclared(kind: CKind, name: &str, location: &CLocation) -> Self {
        Self {
            severity: Severity::Info,
            summary: format!("The {kind} '{name}' at {location} was already declared; ignoring."),
        }
    }

    /// A finished node whose name is already taken in its category.
    pub fn duplicate_node(kind: CKind, name: &str, location: &CLocation) -> Self {
        Self {
            severity: Severity::Warning,
            summary: format!(
                "The {kind} '{name}' at {location} collides with an existing node of the same name; keeping the first."
            ),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_redefinition_summary() {
        let location = CLocation {
            file_name: "config.h".into(),
            file_path: "include/config.h".into(),
            line_number: 12,
            line_column: 9,
        };
        let diagnostic = Diagnostic::macro_already_exists("VERSION", &location);
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(
            diagnostic.summary,
            "The object-like macro 'VERSION' at include/config.h:12:9 already previously exists."
        );
        assert!(diagnostic.to_string().starts_with("[WARN] "));
    }

    #[test]
    fn redeclaration_is_info() {
        let diagnostic = Diagnostic::redeclared(CKind::Function, "f", &CLocation::none());
        assert_eq!(diagnostic.severity, Severity::Info);
        assert!(diagnostic.summary.contains("'f'"));
    }
}
