//! `c2ast target`: target triple description.

use anyhow::{bail, Context, Result};
use c2ast_targets::TargetPlatform;

/// Describe a target triple in detail.
pub fn describe(triple: &str, format: Option<&str>) -> Result<()> {
    let platform =
        TargetPlatform::from_triple(triple).with_context(|| format!("parsing target '{triple}'"))?;

    match format {
        None | Some("human") => print!("{}", render_human(&platform)),
        Some("json") => println!("{}", serde_json::to_string_pretty(&render_json(&platform))?),
        Some(other) => bail!("unknown format: '{other}'. Use 'human' or 'json'."),
    }
    Ok(())
}

fn render_human(platform: &TargetPlatform) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Target: {} ===\n", platform.triple()));
    out.push_str(&format!("  Architecture:     {}\n", platform.architecture()));
    out.push_str(&format!("  Vendor:           {}\n", platform.vendor()));
    out.push_str(&format!(
        "  Operating system: {}\n",
        platform.operating_system().unwrap_or("none")
    ));
    out.push_str(&format!(
        "  Environment:      {}\n",
        platform.environment().unwrap_or("none")
    ));
    out.push_str(&format!(
        "  Pointer width:    {} bits ({} bytes)\n",
        platform.pointer_width_bits(),
        platform.pointer_size_bytes()
    ));
    out
}

fn render_json(platform: &TargetPlatform) -> serde_json::Value {
    serde_json::json!({
        "triple": platform.triple(),
        "architecture": platform.architecture().to_string(),
        "vendor": platform.vendor(),
        "operating-system": platform.operating_system(),
        "environment": platform.environment(),
        "pointer-width-bits": platform.pointer_width_bits(),
    })
}
