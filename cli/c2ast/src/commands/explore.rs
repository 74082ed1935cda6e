//! `c2ast explore`: dumped translation unit to AST JSON.

use std::path::Path;

use anyhow::{Context, Result};
use c2ast_explore::{ExploreConfig, ExploreOutput, Explorer, MemoryTranslationUnit};

/// Run the `c2ast explore --unit <dump.json>` workflow.
///
/// Diagnostics go to stderr. The AST goes to `output`, or to stdout when no
/// output path is given.
pub fn run(unit_path: &Path, config_path: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let result = explore_file(unit_path, config_path)?;

    for diagnostic in &result.diagnostics {
        eprintln!("{diagnostic}");
    }

    match output {
        Some(path) => {
            result
                .ast
                .write(path)
                .with_context(|| format!("writing {}", path.display()))?;
            println!(
                "Explored '{}' ({} nodes, {} diagnostics) → {}",
                result.ast.file_name,
                result.ast.node_count(),
                result.diagnostics.len(),
                path.display()
            );
        }
        None => {
            let json = result.ast.to_json().context("serializing AST")?;
            println!("{json}");
        }
    }

    Ok(())
}

/// Load the unit dump and configuration, then explore.
pub fn explore_file(unit_path: &Path, config_path: Option<&Path>) -> Result<ExploreOutput> {
    if !unit_path.is_file() {
        anyhow::bail!("translation unit dump not found: {}", unit_path.display());
    }

    let config = match config_path {
        Some(path) => {
            ExploreConfig::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => ExploreConfig::default(),
    };

    let unit = MemoryTranslationUnit::load(unit_path)
        .with_context(|| format!("loading {}", unit_path.display()))?;

    Explorer::new(config)
        .explore(&unit)
        .with_context(|| format!("exploring {}", unit_path.display()))
}
