//! Rule-based execution engine for finite-state devices whose rules rewrite
//! themselves while running.
//!
//! ## Core Concepts
//!
//! - **Configuration**: a named state of a device
//! - **Event**: an input symbol consumed by a rule
//! - **Rule**: a `(source, event, destination)` triple; the empty event is epsilon
//! - **Device**: configurations, rules, an initial and an accepting set
//! - **ExecutionContext**: per-run state (current configuration, output)
//! - **Executor**: the driver loop running a device over an input stream
//!
//! ## Adaptivity
//!
//! [`adaptive::AdaptiveDevice`] wraps any [`Device`] and lets rules carry pre
//! and post calls to [`adaptive::AdaptiveFunction`]s. A call may insert or
//! remove rules anywhere in the device, including the rule being applied.
//! Mutations are never rolled back: they survive rejection, errors and later
//! runs against the same device.
//!
//! The engine is single-threaded and holds no locks. Callers sharing a device
//! across threads serialize runs themselves.

pub mod adaptive;
mod device;
mod error;
mod executor;
mod input;
mod rule;

#[cfg(test)]
mod test_fixtures;

pub use device::{Configuration, Device, Event, ExecutionContext, OutputSymbol};
pub use error::{
    Diagnostics, EngineResult, ExecutionError, ExecutionErrorKind, ResolutionError,
    ResolutionResult,
};
pub use executor::{run, Executor, ExecutorConfig};
pub use input::{InputSnapshot, InputStream};
pub use rule::{apply_rule, write_triple, Rule, Transition, EPSILON};
