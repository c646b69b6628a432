//! Run command implementation.
//!
//! Runs inputs in order against one device. Adaptive mutations carry over
//! from one input to the next unless `fresh` rebuilds the device per input.

use adaptive_automaton::{Automaton, DeviceDescription, StringInput};
use adaptive_engine::adaptive::AdaptiveDevice;
use adaptive_engine::{Executor, ExecutorConfig, OutputSymbol};
use anyhow::{Context, Result};
use tracing::info;

/// Options shared by `run` and `repl`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Input symbol separator.
    pub separator: String,
    /// Rebuild the device before every input.
    pub fresh: bool,
    /// Maximum rule applications per input.
    pub max_steps: Option<usize>,
}

impl RunOptions {
    fn executor(&self) -> Executor {
        Executor::with_config(ExecutorConfig {
            max_steps: self.max_steps,
        })
    }
}

/// A device plus what is needed to rebuild it.
pub struct Session<'a> {
    description: &'a DeviceDescription,
    device: AdaptiveDevice<Automaton>,
    options: RunOptions,
}

impl<'a> Session<'a> {
    /// Build the device and start a session.
    pub fn new(description: &'a DeviceDescription, options: RunOptions) -> Result<Self> {
        let device = description.build().context("Failed to build device")?;
        Ok(Self {
            description,
            device,
            options,
        })
    }

    /// Run one input and return the verdict.
    pub fn run(&mut self, text: &str) -> Result<OutputSymbol> {
        if self.options.fresh {
            self.device = self.description.build().context("Failed to build device")?;
        }
        let mut input = StringInput::with_separator(text, &self.options.separator);
        let output = self
            .options
            .executor()
            .run(&mut self.device, &mut input)
            .with_context(|| format!("Run failed on input `{text}`"))?;
        info!(input = text, output = %output, "input_evaluated");
        Ok(output)
    }
}

/// Run every input and print `<input>: <verdict>` per line.
pub fn execute(
    description: &DeviceDescription,
    inputs: &[String],
    options: RunOptions,
) -> Result<Vec<OutputSymbol>> {
    let mut session = Session::new(description, options)?;
    let mut outputs = Vec::with_capacity(inputs.len());
    for text in inputs {
        let output = session.run(text)?;
        println!("{}: {}", text, output);
        outputs.push(output);
    }
    Ok(outputs)
}
