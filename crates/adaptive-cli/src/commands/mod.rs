//! CLI command implementations.

pub mod config;
pub mod example;
pub mod repl;
pub mod run;
pub mod show;

use std::path::Path;

use adaptive_automaton::{samples, DeviceDescription};
use anyhow::{Context, Result};

/// Load a builtin sample or a description file.
pub fn load_description(builtin: Option<&str>, device: Option<&Path>) -> Result<DeviceDescription> {
    match (builtin, device) {
        (Some(name), _) => samples::builtin(name).with_context(|| {
            format!(
                "Unknown builtin device: {}. Available: {}",
                name,
                samples::BUILTINS.join(", ")
            )
        }),
        (None, Some(path)) => DeviceDescription::load(path)
            .with_context(|| format!("Failed to load device from {}", path.display())),
        (None, None) => anyhow::bail!("Either --builtin or --device is required"),
    }
}

/// Pick the input separator: flag, then the description, then the config.
pub fn resolve_separator(
    flag: Option<&str>,
    description: &DeviceDescription,
    config: &crate::config::Config,
) -> String {
    flag.or(description.separator())
        .unwrap_or(config.separator.as_str())
        .to_string()
}
