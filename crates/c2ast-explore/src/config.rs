//! Explorer configuration (`c2ast.toml`).
//!
//! ```toml
//! target = "aarch64-apple-darwin"
//! user-include-directories = ["/home/me/project/include"]
//!
//! [explorer]
//! system-declarations = false
//! opaque-types = ["FILE"]
//!
//! [[linked-paths]]
//! from = "/home/me/project"
//! to = "project"
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use c2ast_targets::TargetPlatform;
use serde::{Deserialize, Serialize};

use crate::error::{ExploreError, Result};

fn enabled() -> bool {
    true
}

/// Options fixed for the lifetime of one exploration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ExplorerOptions {
    /// Explore object-like macros.
    #[serde(default = "enabled")]
    pub macro_objects: bool,
    /// Explore global variables.
    #[serde(default = "enabled")]
    pub variables: bool,
    /// Explore functions.
    #[serde(default = "enabled")]
    pub functions: bool,
    /// Include declarations that live in system headers.
    #[serde(default)]
    pub system_declarations: bool,
    /// Include enums that nothing else references.
    #[serde(default = "enabled")]
    pub enums_dangling: bool,
    /// Emit full file paths instead of include-relative ones.
    #[serde(default)]
    pub location_full_paths: bool,
    /// Type names always treated as opaque.
    #[serde(default)]
    pub opaque_types: BTreeSet<String>,
}

impl Default for ExplorerOptions {
    fn default() -> Self {
        Self {
            macro_objects: true,
            variables: true,
            functions: true,
            system_declarations: false,
            enums_dangling: true,
            location_full_paths: false,
            opaque_types: BTreeSet::new(),
        }
    }
}

impl ExplorerOptions {
    pub fn is_opaque_override(&self, name: &str) -> bool {
        self.opaque_types.contains(name)
    }
}

/// One directory rewrite applied to source locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkedPath {
    pub from: String,
    pub to: String,
}

fn default_target() -> String {
    TargetPlatform::default().triple().to_string()
}

/// Everything an exploration run is configured with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ExploreConfig {
    /// Requested target triple.
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default)]
    pub explorer: ExplorerOptions,
    /// Stripped from location paths, first match wins.
    #[serde(default)]
    pub user_include_directories: Vec<String>,
    /// Rewritten in location paths, first match wins.
    #[serde(default)]
    pub linked_paths: Vec<LinkedPath>,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            explorer: ExplorerOptions::default(),
            user_include_directories: Vec::new(),
            linked_paths: Vec::new(),
        }
    }
}

impl ExploreConfig {
    /// Parse a configuration from a TOML string.
    pub fn parse(input: &str) -> Result<Self> {
        let config: ExploreConfig = toml::from_str(input)?;

        if let Some(link) = config.linked_paths.iter().find(|l| l.from.is_empty()) {
            return Err(ExploreError::InvalidConfig {
                detail: format!("linked-paths entry to '{}' has an empty 'from'", link.to),
            });
        }

        config.requested_platform()?;
        Ok(config)
    }

    /// Parse a configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// The platform the caller asked to target.
    pub fn requested_platform(&self) -> Result<TargetPlatform> {
        Ok(TargetPlatform::from_triple(&self.target)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = ExploreConfig::parse("").unwrap();
        assert_eq!(config, ExploreConfig::default());
        assert!(config.explorer.macro_objects);
        assert!(config.explorer.enums_dangling);
        assert!(!config.explorer.system_declarations);
        assert!(!config.explorer.location_full_paths);
        assert_eq!(config.target, "x86_64-unknown-linux-gnu");
    }

    #[test]
    fn parse_full_config() {
        let input = r#"
target = "aarch64-apple-darwin"
user-include-directories = ["/src/include", "/usr/local/include"]

[explorer]
variables = false
system-declarations = true
opaque-types = ["FILE", "pthread_t"]

[[linked-paths]]
from = "/home/ci/build"
to = "project"
"#;
        let config = ExploreConfig::parse(input).unwrap();
        assert!(!config.explorer.variables);
        assert!(config.explorer.functions);
        assert!(config.explorer.system_declarations);
        assert!(config.explorer.is_opaque_override("FILE"));
        assert!(!config.explorer.is_opaque_override("Foo"));
        assert_eq!(config.user_include_directories.len(), 2);
        assert_eq!(config.linked_paths[0].to, "project");
        assert_eq!(config.requested_platform().unwrap().pointer_width_bits(), 64);
    }

    #[test]
    fn reject_unknown_explorer_key() {
        let err = ExploreConfig::parse("[explorer]\nmacros = true\n").unwrap_err();
        assert!(matches!(err, ExploreError::Toml(_)));
    }

    #[test]
    fn reject_misspelled_top_level_key() {
        let err = ExploreConfig::parse("linked-path = []\n").unwrap_err();
        assert!(matches!(err, ExploreError::Toml(_)));
        let err = ExploreConfig::parse("user-include-dirs = [\"/usr\"]\n").unwrap_err();
        assert!(matches!(err, ExploreError::Toml(_)));
    }

    #[test]
    fn reject_bad_target() {
        let err = ExploreConfig::parse("target = \"\"\n").unwrap_err();
        assert!(matches!(err, ExploreError::Target(_)));
    }

    #[test]
    fn reject_empty_linked_path() {
        let input = "[[linked-paths]]\nfrom = \"\"\nto = \"x\"\n";
        let err = ExploreConfig::parse(input).unwrap_err();
        assert!(matches!(err, ExploreError::InvalidConfig { .. }));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c2ast.toml");
        std::fs::write(&path, "[explorer]\nfunctions = false\n").unwrap();
        let config = ExploreConfig::load(&path).unwrap();
        assert!(!config.explorer.functions);
    }
}
