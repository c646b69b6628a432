//! Example command implementation: export a builtin description.

use std::path::Path;

use anyhow::{Context, Result};

/// Write the named builtin description as pretty JSON to `output`, or stdout.
pub fn execute(name: &str, output: Option<&Path>) -> Result<()> {
    let description = super::load_description(Some(name), None)?;
    let json = description.to_json_pretty()?;
    match output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✅ Wrote {} to {}", name, path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
