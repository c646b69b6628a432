//! The generic device abstraction driven by the executor.
//!
//! A concrete substrate (a finite automaton, for instance) supplies a
//! [`Configuration`] type for its states, an [`Event`] type for its input
//! symbols, a [`Rule`] type and an [`ExecutionContext`] holding per-run state.
//! The adaptive layer wraps any such device and implements the same contract,
//! so the executor is written once for both.
//!
//! Contexts do not hold on to the device: every context operation that needs
//! it receives the device explicitly. This keeps the rule table mutable while
//! a run is in progress.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::{EngineResult, ResolutionResult};
use crate::input::InputStream;
use crate::rule::Rule;

/// A named state of a device.
///
/// The name is the identity key within one device.
pub trait Configuration: Clone + Eq + Hash + fmt::Debug + fmt::Display {
    /// Unique name within the device.
    fn name(&self) -> &str;

    /// Entry hook invoked each time the executor enters this configuration.
    fn on_enter<I: InputStream + ?Sized>(&self, input: &I) -> EngineResult<()> {
        let _ = input;
        Ok(())
    }
}

/// An input symbol.
pub trait Event: Clone + Eq + Hash + fmt::Debug + fmt::Display {
    /// Textual form of the symbol.
    fn symbol(&self) -> &str;
}

/// Terminal output of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSymbol {
    /// Input fully consumed in an accepting configuration.
    Accept,
    /// Anything else.
    Reject,
}

impl OutputSymbol {
    /// Both output symbols.
    pub const ALL: [OutputSymbol; 2] = [OutputSymbol::Accept, OutputSymbol::Reject];

    /// Check if this is the accepting output.
    pub fn is_accept(&self) -> bool {
        matches!(self, OutputSymbol::Accept)
    }

    /// Textual form.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSymbol::Accept => "accept",
            OutputSymbol::Reject => "reject",
        }
    }
}

impl fmt::Display for OutputSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule-driven device: configurations, rules, initial and accepting sets.
pub trait Device {
    /// State type.
    type Configuration: Configuration;
    /// Input symbol type.
    type Event: Event;
    /// Rule type.
    type Rule: Rule<Configuration = Self::Configuration>;
    /// Per-run execution state.
    type Context: ExecutionContext<Self>;

    /// All registered configurations.
    fn configurations(&self) -> Vec<Self::Configuration>;

    /// Look up a configuration by name.
    fn configuration(&self, name: &str) -> Option<Self::Configuration>;

    /// The initial configuration, if one was set.
    fn initial(&self) -> Option<Self::Configuration>;

    /// Accepting configurations.
    fn accepting(&self) -> Vec<Self::Configuration>;

    /// Check if a configuration is accepting.
    fn is_accepting(&self, configuration: &Self::Configuration) -> bool;

    /// Input alphabet; `None` means unconstrained.
    fn events(&self) -> Option<Vec<Self::Event>>;

    /// Output alphabet.
    fn output_symbols(&self) -> &[OutputSymbol] {
        &OutputSymbol::ALL
    }

    /// Every rule currently in the device.
    fn rules(&self) -> Vec<Self::Rule>;

    /// Start a run positioned at the initial configuration.
    fn start(&self) -> EngineResult<Self::Context>;

    /// Mint and register a fresh, uniquely named configuration.
    fn create_configuration(&mut self) -> Self::Configuration;

    /// Register a configuration.
    fn add_configuration(
        &mut self,
        configuration: Self::Configuration,
        initial: bool,
        accepting: bool,
    ) -> ResolutionResult<()>;

    /// Add a rule, replacing any rule with the same `(from, event)` key.
    ///
    /// The empty event is epsilon.
    fn add_rule(
        &mut self,
        from: &Self::Configuration,
        event: &str,
        to: &Self::Configuration,
    ) -> ResolutionResult<Self::Rule>;

    /// Remove every rule matching the given fields; omitted fields match
    /// anything. At least one field must be given.
    fn remove_rules(
        &mut self,
        from: Option<&Self::Configuration>,
        event: Option<&str>,
        to: Option<&Self::Configuration>,
    ) -> ResolutionResult<Vec<Self::Rule>>;

    /// Check if the rule is still present in its source's rule table.
    fn rule_exists(&self, rule: &Self::Rule) -> bool;
}

/// Per-run execution state of a device.
pub trait ExecutionContext<D: Device + ?Sized> {
    /// The configuration the run is in.
    fn current(&self) -> &D::Configuration;

    /// Move to another configuration. Fails once the run terminated.
    fn change_configuration(&mut self, next: D::Configuration) -> EngineResult<()>;

    /// Apply a rule, returning the configuration the device is in afterwards.
    fn apply(
        &mut self,
        device: &mut D,
        input: &mut dyn InputStream<Event = D::Event>,
        rule: &D::Rule,
    ) -> EngineResult<D::Configuration>;

    /// Candidate rules from the current configuration for an event (`None`
    /// for epsilon), in priority order. The first element is authoritative.
    fn rules_for(&self, device: &D, event: Option<&D::Event>) -> Vec<D::Rule>;

    /// End the run and fix its output.
    fn terminate(&mut self, device: &D, fully_consumed: bool);

    /// Check if the run terminated.
    fn is_terminated(&self) -> bool;

    /// Output of the run; `None` until terminated.
    fn output(&self) -> Option<OutputSymbol>;
}
