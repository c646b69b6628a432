//! The driver loop that runs a device over an input stream.
//!
//! ```text
//! while input remains, or an epsilon rule leaves a non-accepting configuration:
//!     candidates := rules_for(next symbol), else rules_for(epsilon)
//!     no candidate       -> reject
//!     first candidate    -> apply, enter the returned configuration
//! input consumed -> accept iff the configuration is accepting
//! ```
//!
//! Candidates are re-derived on every iteration, so rule-table mutations made
//! while applying a rule are visible from the next iteration on.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::device::{Configuration, Device, Event, ExecutionContext, OutputSymbol};
use crate::error::{EngineResult, ExecutionError, ExecutionErrorKind};
use crate::input::InputStream;

/// Configuration for the executor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Maximum rule applications per run; `None` is unbounded.
    #[serde(default)]
    pub max_steps: Option<usize>,
}

impl ExecutorConfig {
    /// Config bounding each run to `max_steps` rule applications.
    pub fn bounded(max_steps: usize) -> Self {
        Self {
            max_steps: Some(max_steps),
        }
    }
}

/// Runs devices to acceptance or rejection.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    config: ExecutorConfig,
}

/// Run a device with the default (unbounded) executor.
pub fn run<D: Device>(
    device: &mut D,
    input: &mut dyn InputStream<Event = D::Event>,
) -> EngineResult<OutputSymbol> {
    Executor::new().run(device, input)
}

impl Executor {
    /// Create an executor with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration.
    pub fn with_config(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Get the executor configuration.
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run `device` over `input`.
    ///
    /// Rejection is a normal output. Errors are fatal for the run; any rule
    /// table mutation already performed stays in place.
    pub fn run<D: Device>(
        &self,
        device: &mut D,
        input: &mut dyn InputStream<Event = D::Event>,
    ) -> EngineResult<OutputSymbol> {
        let initial = device.initial().ok_or_else(|| {
            ExecutionError::new(ExecutionErrorKind::MissingInitialConfiguration).with_input(&*input)
        })?;
        info!(configuration = %initial, "initial_configuration");

        let mut context = device.start()?;
        initial.on_enter(&*input)?;

        let mut steps = 0usize;
        while input.has_next() || self.epsilon_pending(device, &context) {
            let candidates = match input.peek().cloned() {
                None => {
                    debug!("input_exhausted_looking_for_epsilon_rules");
                    let candidates = context.rules_for(device, None);
                    if candidates.is_empty() {
                        return Err(ExecutionError::new(ExecutionErrorKind::MissingEpsilonRule)
                            .with_configuration(context.current())
                            .with_input(&*input));
                    }
                    candidates
                }
                Some(symbol) => {
                    debug!(event = symbol.symbol(), "looking_for_rules");
                    let mut candidates = context.rules_for(device, Some(&symbol));
                    if candidates.is_empty() {
                        debug!(event = symbol.symbol(), "no_rule_for_event_trying_epsilon");
                        candidates = context.rules_for(device, None);
                    }
                    if candidates.is_empty() {
                        info!(
                            configuration = %context.current(),
                            event = symbol.symbol(),
                            "no_rule_for_event_rejecting"
                        );
                        context.terminate(device, false);
                        return Ok(context.output().unwrap_or(OutputSymbol::Reject));
                    }
                    candidates
                }
            };
            debug!(candidates = candidates.len(), "rules_available");

            if let Some(limit) = self.config.max_steps {
                if steps >= limit {
                    return Err(
                        ExecutionError::new(ExecutionErrorKind::StepLimitExceeded { limit })
                            .with_configuration(context.current())
                            .with_input(&*input),
                    );
                }
            }
            steps += 1;

            let Some(rule) = candidates.into_iter().next() else {
                continue;
            };
            info!(rule = %rule, "applying_rule");
            let next = context.apply(device, input, &rule)?;
            next.on_enter(&*input)?;

            debug!(remaining = %render(&input.remaining()), "input_remaining");
        }

        context.terminate(device, true);
        let output = context.output().unwrap_or(OutputSymbol::Reject);
        info!(
            configuration = %context.current(),
            output = %output,
            steps,
            "execution_complete"
        );
        Ok(output)
    }

    fn epsilon_pending<D: Device>(&self, device: &D, context: &D::Context) -> bool {
        !context.rules_for(device, None).is_empty() && !device.is_accepting(context.current())
    }
}

fn render<E: Event>(events: &[E]) -> String {
    events.iter().map(|e| e.symbol()).collect()
}
