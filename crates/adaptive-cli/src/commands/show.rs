//! Show command implementation.

use std::fmt::Write;

use adaptive_automaton::{Automaton, DeviceDescription};
use adaptive_engine::adaptive::AdaptiveDevice;
use adaptive_engine::{Configuration, Device};
use anyhow::{Context, Result};

/// Print states, functions and rules of a device.
pub fn execute(description: &DeviceDescription) -> Result<()> {
    let device = description.build().context("Failed to build device")?;
    print!("{}", render(description, &device)?);
    Ok(())
}

/// Render the listing printed by [`execute`].
pub fn render(description: &DeviceDescription, device: &AdaptiveDevice<Automaton>) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "Device: {}", description.name.as_deref().unwrap_or("(unnamed)"))?;
    writeln!(out, "{:-<40}", "")?;

    writeln!(out, "States:")?;
    for state in device.configurations() {
        let mut flags = Vec::new();
        if device.initial().as_ref() == Some(&state) {
            flags.push("initial");
        }
        if device.is_accepting(&state) {
            flags.push("accepting");
        }
        if flags.is_empty() {
            writeln!(out, "  {}", state.name())?;
        } else {
            writeln!(out, "  {} [{}]", state.name(), flags.join(", "))?;
        }
    }

    match device.events() {
        Some(events) => {
            let symbols: Vec<String> = events.iter().map(|e| e.to_string()).collect();
            writeln!(out, "Alphabet: {}", symbols.join(" "))?;
        }
        None => writeln!(out, "Alphabet: (unconstrained)")?,
    }

    let functions: Vec<_> = device.mechanism().functions().collect();
    if !functions.is_empty() {
        writeln!(out, "Functions:")?;
        for function in functions {
            writeln!(
                out,
                "  {} (generators: {})",
                function.name(),
                function.generators()
            )?;
            if let Some(pre) = function.pre_action() {
                writeln!(out, "    pre  {}", pre)?;
            }
            for action in function.actions() {
                writeln!(out, "    {}", action)?;
            }
            if let Some(post) = function.post_action() {
                writeln!(out, "    post {}", post)?;
            }
        }
    }

    writeln!(out, "Rules:")?;
    for rule in device.rules() {
        writeln!(out, "  {}", rule)?;
    }
    Ok(out)
}
