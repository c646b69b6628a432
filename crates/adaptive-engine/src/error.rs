//! Error types for device execution and adaptive actions.
//!
//! Two levels exist:
//!
//! - [`ResolutionError`] is local: raised by parameter resolution, adaptive
//!   actions and rule-table edits. It is reported to whoever invoked the action.
//! - [`ExecutionError`] is fatal: it aborts a run and carries [`Diagnostics`]
//!   describing where the device was when it failed. Local errors that escape a
//!   rule application are wrapped into it.

use std::fmt;

use thiserror::Error;

use crate::adaptive::ParameterKind;
use crate::input::{InputSnapshot, InputStream};

/// Result type alias for fatal execution failures.
pub type EngineResult<T> = Result<T, ExecutionError>;

/// Result type alias for local resolution failures.
pub type ResolutionResult<T> = Result<T, ResolutionError>;

/// Local errors raised while resolving parameters or editing a rule table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// A reference points past the end of the call's argument list.
    #[error("insufficient parameters: index {index} requested, {available} available")]
    InsufficientParameters { index: usize, available: usize },

    /// A parameter or argument has the wrong kind for where it is used.
    #[error("parameter kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        expected: ParameterKind,
        found: ParameterKind,
    },

    /// A generator reference points past the generators of this invocation.
    #[error("generator absent or index out of range: index {index}, {available} generated")]
    GeneratorUnavailable { index: usize, available: usize },

    /// No configuration with this name is registered in the device.
    #[error("unknown configuration: {name}")]
    UnknownConfiguration { name: String },

    /// No adaptive function with this name is registered.
    #[error("unknown adaptive function: {name}")]
    UnknownFunction { name: String },

    /// A configuration with this name already exists.
    #[error("configuration already exists: {name}")]
    DuplicateConfiguration { name: String },

    /// A second configuration was registered as initial.
    #[error("initial configuration already set: `{existing}`, cannot also make `{name}` initial")]
    DuplicateInitialConfiguration { existing: String, name: String },

    /// Configuration names must be non-empty.
    #[error("configuration name cannot be empty")]
    InvalidConfigurationName,

    /// Removal with source, event and destination all unconstrained.
    #[error("refusing to remove every rule of the device")]
    RemoveEverything,

    /// A parameter of the wrong kind was given to an action slot.
    #[error("invalid {kind} parameter for the {role} of an adaptive action")]
    InvalidParameter {
        role: &'static str,
        kind: ParameterKind,
    },
}

/// What went wrong during a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionErrorKind {
    /// The device was asked to run without an initial configuration.
    #[error("an initial configuration is required to run the device")]
    MissingInitialConfiguration,

    /// A rule was applied while the device was in a different configuration.
    #[error("wrong configuration for rule: rule starts at `{expected}`, device is at `{actual}`")]
    WrongConfiguration { expected: String, actual: String },

    /// A consuming rule was applied to an exhausted input.
    #[error("rule consumes `{expected}` but the input is exhausted")]
    InputExhausted { expected: String },

    /// A consuming rule was applied but the next symbol differs.
    #[error("wrong symbol: rule consumes `{expected}`, next input symbol is `{found}`")]
    WrongSymbol { expected: String, found: String },

    /// The next symbol is outside the device's input alphabet.
    #[error("symbol `{symbol}` is not part of the input alphabet")]
    InvalidSymbol { symbol: String },

    /// The loop guard promised an epsilon rule but none was found.
    #[error("the epsilon rule list for this configuration should not be empty")]
    MissingEpsilonRule,

    /// The execution context was used after it terminated.
    #[error("execution already terminated")]
    Terminated,

    /// The configured step limit was reached.
    #[error("step limit of {limit} rule applications exceeded")]
    StepLimitExceeded { limit: usize },

    /// A local error escaped an adaptive function call.
    #[error("adaptive action failed: {0}")]
    Resolution(#[from] ResolutionError),
}

/// Where the device was when an execution error happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Name of the offending configuration.
    pub configuration: Option<String>,
    /// Rendering of the offending rule.
    pub rule: Option<String>,
    /// Input stream at the moment of failure.
    pub input: Option<InputSnapshot>,
}

impl Diagnostics {
    /// Check if no detail was recorded.
    pub fn is_empty(&self) -> bool {
        self.configuration.is_none() && self.rule.is_none() && self.input.is_none()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        writeln!(f)?;
        writeln!(f, "device details:")?;
        match &self.configuration {
            Some(name) => writeln!(f, "  configuration: {name}")?,
            None => writeln!(f, "  configuration: none")?,
        }
        match &self.rule {
            Some(rule) => writeln!(f, "  rule: {rule}")?,
            None => writeln!(f, "  rule: none")?,
        }
        match &self.input {
            Some(input) => {
                writeln!(f, "  original input: {}", input.render_original())?;
                write!(f, "  consumed input: {}", input.render_consumed())
            }
            None => write!(f, "  input: none"),
        }
    }
}

/// Fatal error aborting a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}{diagnostics}")]
pub struct ExecutionError {
    /// What went wrong.
    pub kind: ExecutionErrorKind,
    /// Where it went wrong.
    pub diagnostics: Diagnostics,
}

impl ExecutionError {
    /// Create an error without diagnostics.
    pub fn new(kind: ExecutionErrorKind) -> Self {
        Self {
            kind,
            diagnostics: Diagnostics::default(),
        }
    }

    /// Record the offending configuration, keeping an earlier one if set.
    pub fn with_configuration(mut self, configuration: impl fmt::Display) -> Self {
        self.diagnostics
            .configuration
            .get_or_insert_with(|| configuration.to_string());
        self
    }

    /// Record the offending rule, keeping an earlier one if set.
    pub fn with_rule(mut self, rule: impl fmt::Display) -> Self {
        self.diagnostics.rule.get_or_insert_with(|| rule.to_string());
        self
    }

    /// Record the input stream state, keeping an earlier snapshot if set.
    pub fn with_input<I: InputStream + ?Sized>(mut self, input: &I) -> Self {
        if self.diagnostics.input.is_none() {
            self.diagnostics.input = Some(input.snapshot());
        }
        self
    }

    /// The local error behind this failure, if any.
    pub fn resolution(&self) -> Option<&ResolutionError> {
        match &self.kind {
            ExecutionErrorKind::Resolution(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ExecutionErrorKind> for ExecutionError {
    fn from(kind: ExecutionErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<ResolutionError> for ExecutionError {
    fn from(err: ResolutionError) -> Self {
        Self::new(ExecutionErrorKind::Resolution(err))
    }
}
