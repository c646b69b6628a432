//! Rules: (source, event, destination) triples.
//!
//! Rule identity is the triple of configuration names and event symbol, never
//! object identity. The empty event is epsilon.

use std::fmt;
use std::hash::Hash;

use tracing::info;

use crate::device::{Configuration, Device, Event, ExecutionContext};
use crate::error::{EngineResult, ExecutionError, ExecutionErrorKind};
use crate::input::InputStream;

/// Event key used for epsilon rules.
pub const EPSILON: &str = "";

/// A rule moving a device from `source` to `destination` on `event`.
pub trait Rule: Clone + Eq + Hash + fmt::Debug + fmt::Display {
    /// Configuration type the rule connects.
    type Configuration: Configuration;

    /// Configuration the rule leaves.
    fn source(&self) -> &Self::Configuration;

    /// Consumed symbol; empty for epsilon.
    fn event(&self) -> &str;

    /// Configuration the rule enters.
    fn destination(&self) -> &Self::Configuration;

    /// Check if the rule consumes no input.
    fn is_epsilon(&self) -> bool {
        self.event().is_empty()
    }
}

/// Plain rule triple, usable by any substrate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transition<C> {
    source: C,
    event: String,
    destination: C,
}

impl<C: Configuration> Transition<C> {
    /// Create a rule; an empty event makes it an epsilon rule.
    pub fn new(source: C, event: impl Into<String>, destination: C) -> Self {
        Self {
            source,
            event: event.into(),
            destination,
        }
    }

    /// Create an epsilon rule.
    pub fn epsilon(source: C, destination: C) -> Self {
        Self::new(source, EPSILON, destination)
    }
}

impl<C: Configuration> Rule for Transition<C> {
    type Configuration = C;

    fn source(&self) -> &C {
        &self.source
    }

    fn event(&self) -> &str {
        &self.event
    }

    fn destination(&self) -> &C {
        &self.destination
    }
}

impl<C: Configuration> fmt::Display for Transition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_triple(f, self.source.name(), &self.event, self.destination.name())
    }
}

/// Render a rule triple as `(source, event, destination)`, epsilon as `ε`.
pub fn write_triple(
    f: &mut fmt::Formatter<'_>,
    source: &str,
    event: &str,
    destination: &str,
) -> fmt::Result {
    let event = if event.is_empty() { "ε" } else { event };
    write!(f, "({source}, {event}, {destination})")
}

/// Apply a rule against a context.
///
/// The context must be in the rule's source configuration. A consuming rule
/// requires the next input symbol to equal its event and consumes it; an
/// epsilon rule leaves the input untouched. The context then moves to the
/// rule's destination, which is returned.
pub fn apply_rule<D, X>(
    rule: &D::Rule,
    input: &mut dyn InputStream<Event = D::Event>,
    context: &mut X,
) -> EngineResult<D::Configuration>
where
    D: Device + ?Sized,
    X: ExecutionContext<D> + ?Sized,
{
    let current = context.current().name().to_string();
    if current != rule.source().name() {
        return Err(fail(
            ExecutionErrorKind::WrongConfiguration {
                expected: rule.source().name().to_string(),
                actual: current,
            },
            rule,
            &*input,
        ));
    }

    if rule.is_epsilon() {
        info!(rule = %rule, "applying_epsilon_rule");
    } else {
        let next = input.peek().map(|e| e.symbol().to_string());
        match next {
            None => {
                return Err(fail(
                    ExecutionErrorKind::InputExhausted {
                        expected: rule.event().to_string(),
                    },
                    rule,
                    &*input,
                ));
            }
            Some(found) if found != rule.event() => {
                return Err(fail(
                    ExecutionErrorKind::WrongSymbol {
                        expected: rule.event().to_string(),
                        found,
                    },
                    rule,
                    &*input,
                ));
            }
            Some(_) => {
                input.consume();
                info!(event = rule.event(), "event_consumed");
            }
        }
    }

    let next = rule.destination().clone();
    info!(configuration = %next, "configuration_changed");
    context
        .change_configuration(next.clone())
        .map_err(|e| e.with_configuration(rule.source()).with_rule(rule).with_input(&*input))?;
    Ok(next)
}

fn fail<R, E>(kind: ExecutionErrorKind, rule: &R, input: &dyn InputStream<Event = E>) -> ExecutionError
where
    R: Rule,
    E: Event,
{
    ExecutionError::new(kind)
        .with_configuration(rule.source())
        .with_rule(rule)
        .with_input(input)
}
