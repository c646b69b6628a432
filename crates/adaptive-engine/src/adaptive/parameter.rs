//! Parameters of adaptive actions and their resolution.
//!
//! A parameter is either a literal [`Argument`] or a reference into the
//! caller's argument list or the invocation's generator list. Resolution turns
//! it into a concrete configuration, event symbol, or argument for a nested
//! call.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::device::{Configuration, Device};
use crate::error::{ResolutionError, ResolutionResult};

/// Semantic kind of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// A configuration name.
    Configuration,
    /// An event symbol.
    Event,
    /// A configuration generated for the running invocation.
    Generator,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParameterKind::Configuration => "configuration",
            ParameterKind::Event => "event",
            ParameterKind::Generator => "generator",
        })
    }
}

/// A concrete value bound into an adaptive function call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Argument {
    /// Name of a configuration of the device.
    Configuration(String),
    /// An event symbol; empty for epsilon.
    Event(String),
}

impl Argument {
    /// Configuration argument.
    pub fn configuration(name: impl Into<String>) -> Self {
        Argument::Configuration(name.into())
    }

    /// Event argument.
    pub fn event(symbol: impl Into<String>) -> Self {
        Argument::Event(symbol.into())
    }

    /// Kind of the argument.
    pub fn kind(&self) -> ParameterKind {
        match self {
            Argument::Configuration(_) => ParameterKind::Configuration,
            Argument::Event(_) => ParameterKind::Event,
        }
    }

    /// Textual payload.
    pub fn value(&self) -> &str {
        match self {
            Argument::Configuration(value) | Argument::Event(value) => value,
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Configuration(name) => f.write_str(name),
            Argument::Event(symbol) if symbol.is_empty() => f.write_str("ε"),
            Argument::Event(symbol) => write!(f, "'{symbol}'"),
        }
    }
}

/// A resolvable parameter of an adaptive action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    /// Literal value.
    Value(Argument),
    /// Index into the call arguments (configuration and event kinds) or into
    /// the generated configurations (generator kind).
    Reference { index: usize, kind: ParameterKind },
}

impl Parameter {
    /// Literal configuration name.
    pub fn configuration(name: impl Into<String>) -> Self {
        Parameter::Value(Argument::configuration(name))
    }

    /// Literal event symbol.
    pub fn event(symbol: impl Into<String>) -> Self {
        Parameter::Value(Argument::event(symbol))
    }

    /// Reference to a configuration-typed call argument.
    pub fn configuration_ref(index: usize) -> Self {
        Parameter::Reference {
            index,
            kind: ParameterKind::Configuration,
        }
    }

    /// Reference to an event-typed call argument.
    pub fn event_ref(index: usize) -> Self {
        Parameter::Reference {
            index,
            kind: ParameterKind::Event,
        }
    }

    /// Reference to a generated configuration.
    pub fn generator(index: usize) -> Self {
        Parameter::Reference {
            index,
            kind: ParameterKind::Generator,
        }
    }

    /// Kind of the parameter.
    pub fn kind(&self) -> ParameterKind {
        match self {
            Parameter::Value(argument) => argument.kind(),
            Parameter::Reference { kind, .. } => *kind,
        }
    }

    /// Check if the parameter denotes a configuration (including generators).
    pub fn denotes_configuration(&self) -> bool {
        self.kind() != ParameterKind::Event
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::Value(argument) => write!(f, "{argument}"),
            Parameter::Reference {
                index,
                kind: ParameterKind::Generator,
            } => write!(f, "g{index}"),
            Parameter::Reference {
                index,
                kind: ParameterKind::Configuration,
            } => write!(f, "c{index}"),
            Parameter::Reference {
                index,
                kind: ParameterKind::Event,
            } => write!(f, "e{index}"),
        }
    }
}

/// Resolves parameters against one adaptive function invocation.
pub struct Resolver<'a, D: Device + ?Sized> {
    arguments: &'a [Argument],
    generators: &'a [D::Configuration],
    device: &'a D,
}

impl<'a, D: Device + ?Sized> Resolver<'a, D> {
    /// Create a resolver over one invocation's arguments and generators.
    pub fn new(
        arguments: &'a [Argument],
        generators: &'a [D::Configuration],
        device: &'a D,
    ) -> Self {
        Self {
            arguments,
            generators,
            device,
        }
    }

    /// Resolve to a registered configuration.
    pub fn configuration(&self, parameter: &Parameter) -> ResolutionResult<D::Configuration> {
        let resolved = match parameter {
            Parameter::Value(Argument::Configuration(name)) => self.lookup(name)?,
            Parameter::Reference {
                index,
                kind: ParameterKind::Generator,
            } => self.generator(*index)?,
            Parameter::Reference {
                index,
                kind: ParameterKind::Configuration,
            } => match self.call_argument(*index)? {
                Argument::Configuration(name) => self.lookup(name)?,
                other => {
                    return Err(ResolutionError::KindMismatch {
                        expected: ParameterKind::Configuration,
                        found: other.kind(),
                    })
                }
            },
            other => {
                return Err(ResolutionError::KindMismatch {
                    expected: ParameterKind::Configuration,
                    found: other.kind(),
                })
            }
        };
        debug!(parameter = %parameter, configuration = resolved.name(), "parameter_resolved");
        Ok(resolved)
    }

    /// Resolve to an event symbol. No device lookup takes place.
    pub fn event(&self, parameter: &Parameter) -> ResolutionResult<String> {
        let resolved = match parameter {
            Parameter::Value(Argument::Event(symbol)) => symbol.clone(),
            Parameter::Reference {
                index,
                kind: ParameterKind::Event,
            } => match self.call_argument(*index)? {
                Argument::Event(symbol) => symbol.clone(),
                other => {
                    return Err(ResolutionError::KindMismatch {
                        expected: ParameterKind::Event,
                        found: other.kind(),
                    })
                }
            },
            other => {
                return Err(ResolutionError::KindMismatch {
                    expected: ParameterKind::Event,
                    found: other.kind(),
                })
            }
        };
        debug!(parameter = %parameter, event = %resolved, "parameter_resolved");
        Ok(resolved)
    }

    /// Resolve to an argument for a nested call.
    ///
    /// Generators become configuration arguments carrying the generated name.
    /// Configuration references are looked up in the device, so an unknown
    /// name fails here rather than when the nested call fires.
    pub fn argument(&self, parameter: &Parameter) -> ResolutionResult<Argument> {
        match parameter {
            Parameter::Value(argument) => Ok(argument.clone()),
            Parameter::Reference {
                kind: ParameterKind::Configuration | ParameterKind::Generator,
                ..
            } => Ok(Argument::configuration(self.configuration(parameter)?.name())),
            Parameter::Reference {
                kind: ParameterKind::Event,
                ..
            } => Ok(Argument::event(self.event(parameter)?)),
        }
    }

    fn call_argument(&self, index: usize) -> ResolutionResult<&'a Argument> {
        self.arguments
            .get(index)
            .ok_or(ResolutionError::InsufficientParameters {
                index,
                available: self.arguments.len(),
            })
    }

    fn generator(&self, index: usize) -> ResolutionResult<D::Configuration> {
        self.generators
            .get(index)
            .cloned()
            .ok_or(ResolutionError::GeneratorUnavailable {
                index,
                available: self.generators.len(),
            })
    }

    fn lookup(&self, name: &str) -> ResolutionResult<D::Configuration> {
        self.device
            .configuration(name)
            .ok_or_else(|| ResolutionError::UnknownConfiguration {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{Node, TableDevice};

    fn device() -> TableDevice {
        let mut device = TableDevice::new();
        device.state("1", true, false);
        device.state("2", false, true);
        device
    }

    #[test]
    fn test_literal_configuration_is_looked_up() {
        let device = device();
        let resolver = Resolver::new(&[], &[], &device);

        assert_eq!(
            resolver.configuration(&Parameter::configuration("2")).unwrap(),
            Node::new("2")
        );
        assert_eq!(
            resolver.configuration(&Parameter::configuration("9")).unwrap_err(),
            ResolutionError::UnknownConfiguration { name: "9".into() }
        );
    }

    #[test]
    fn test_references_read_call_arguments() {
        let device = device();
        let arguments = [Argument::configuration("1"), Argument::event("a")];
        let resolver = Resolver::new(&arguments, &[], &device);

        assert_eq!(
            resolver.configuration(&Parameter::configuration_ref(0)).unwrap(),
            Node::new("1")
        );
        assert_eq!(resolver.event(&Parameter::event_ref(1)).unwrap(), "a");
        assert_eq!(
            resolver.configuration(&Parameter::configuration_ref(1)).unwrap_err(),
            ResolutionError::KindMismatch {
                expected: ParameterKind::Configuration,
                found: ParameterKind::Event,
            }
        );
        assert_eq!(
            resolver.event(&Parameter::event_ref(5)).unwrap_err(),
            ResolutionError::InsufficientParameters {
                index: 5,
                available: 2
            }
        );
    }

    #[test]
    fn test_generators_are_indexed() {
        let device = device();
        let generators = [Node::new("g0")];
        let resolver = Resolver::new(&[], &generators, &device);

        assert_eq!(
            resolver.configuration(&Parameter::generator(0)).unwrap(),
            Node::new("g0")
        );
        assert_eq!(
            resolver.configuration(&Parameter::generator(1)).unwrap_err(),
            ResolutionError::GeneratorUnavailable {
                index: 1,
                available: 1
            }
        );
        assert_eq!(
            resolver.argument(&Parameter::generator(0)).unwrap(),
            Argument::configuration("g0")
        );
    }

    #[test]
    fn test_nested_call_arguments_are_resolved() {
        let device = device();
        let arguments = [
            Argument::configuration("2"),
            Argument::event("b"),
            Argument::configuration("nope"),
        ];
        let resolver = Resolver::new(&arguments, &[], &device);

        assert_eq!(
            resolver.argument(&Parameter::configuration_ref(0)).unwrap(),
            Argument::configuration("2")
        );
        assert_eq!(
            resolver.argument(&Parameter::event_ref(1)).unwrap(),
            Argument::event("b")
        );
        assert_eq!(
            resolver.argument(&Parameter::configuration_ref(2)).unwrap_err(),
            ResolutionError::UnknownConfiguration {
                name: "nope".into()
            }
        );
        assert_eq!(
            resolver.argument(&Parameter::event_ref(0)).unwrap_err(),
            ResolutionError::KindMismatch {
                expected: ParameterKind::Event,
                found: ParameterKind::Configuration,
            }
        );
    }

    #[test]
    fn test_event_slot_rejects_configurations() {
        let device = device();
        let resolver = Resolver::new(&[], &[], &device);

        assert!(matches!(
            resolver.event(&Parameter::generator(0)),
            Err(ResolutionError::KindMismatch {
                expected: ParameterKind::Event,
                found: ParameterKind::Generator,
            })
        ));
    }
}
