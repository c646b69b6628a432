//! Config command implementation.

use anyhow::Result;

use crate::config::Config;

/// Show the effective configuration.
pub fn show(config: &Config) -> Result<()> {
    println!("Adapt CLI Configuration");
    println!("{:-<40}", "");
    println!(
        "Separator:  {}",
        if config.separator.is_empty() {
            "(none, one symbol per character)".to_string()
        } else {
            format!("{:?}", config.separator)
        }
    );
    println!(
        "Max steps:  {}",
        config
            .max_steps
            .map(|n| n.to_string())
            .unwrap_or_else(|| "(unbounded)".to_string())
    );
    println!("Log format: {}", config.log_format);

    if let Some(path) = Config::config_file_path() {
        println!("\nConfig file: {}", path.display());
    }
    Ok(())
}
