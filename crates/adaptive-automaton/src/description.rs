//! Declarative JSON descriptions of adaptive automata.
//!
//! ```json
//! {
//!   "name": "anbncn",
//!   "states": [{ "name": "1", "initial": true }, { "name": "4", "accepting": true }],
//!   "functions": [{
//!     "name": "grow",
//!     "generators": 2,
//!     "actions": [
//!       { "type": "remove", "source": { "reference": { "index": 0, "kind": "configuration" } },
//!         "event": { "value": { "event": "b" } } },
//!       { "type": "insert", "source": { "reference": { "index": 0, "kind": "configuration" } },
//!         "event": { "value": { "event": "b" } },
//!         "destination": { "reference": { "index": 0, "kind": "generator" } } }
//!     ]
//!   }],
//!   "rules": [{ "source": "2", "event": "a", "destination": "2",
//!               "post": { "function": "grow", "arguments": [{ "configuration": "2" }] } }]
//! }
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use adaptive_engine::adaptive::{
    AdaptiveAction, AdaptiveDevice, AdaptiveFunction, AdaptiveFunctionCall, Argument,
    CallTemplate, InsertAction, Parameter, RemoveAction,
};
use adaptive_engine::{Device, ResolutionError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::automaton::Automaton;
use crate::state::{State, Symbol};

/// Result type alias for description operations.
pub type DescriptionResult<T> = Result<T, DescriptionError>;

/// Errors raised while loading or building a description.
#[derive(Debug, Error)]
pub enum DescriptionError {
    /// The description is not valid JSON or does not match the schema.
    #[error("invalid device description: {0}")]
    Json(#[from] serde_json::Error),

    /// The description file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No state is flagged initial.
    #[error("the description declares no initial state")]
    NoInitialState,

    /// More than one state is flagged initial.
    #[error("more than one initial state: `{first}` and `{second}`")]
    MultipleInitialStates { first: String, second: String },

    /// A state, function, action or rule was rejected by the device.
    #[error("invalid {item}: {source}")]
    Invalid {
        item: String,
        #[source]
        source: ResolutionError,
    },
}

impl DescriptionError {
    fn invalid(item: impl Into<String>) -> impl FnOnce(ResolutionError) -> Self {
        let item = item.into();
        move |source| DescriptionError::Invalid { item, source }
    }
}

/// A whole adaptive automaton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescription {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// States in declaration order.
    pub states: Vec<StateDescription>,

    /// Input alphabet; absent means unconstrained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alphabet: Option<Vec<String>>,

    /// Input separator suggested for this device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,

    /// Adaptive functions, registered before any rule.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionDescription>,

    /// Rules, added in order.
    #[serde(default)]
    pub rules: Vec<RuleDescription>,
}

/// A state of the described automaton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDescription {
    /// Unique state name.
    pub name: String,
    /// Whether the run starts here. Exactly one state must set it.
    #[serde(default, skip_serializing_if = "is_false")]
    pub initial: bool,
    /// Whether the state is accepting.
    #[serde(default, skip_serializing_if = "is_false")]
    pub accepting: bool,
}

/// An adaptive function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescription {
    /// Name used by calls.
    pub name: String,
    /// Number of states generated per invocation.
    #[serde(default)]
    pub generators: usize,
    /// Action run before the action set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre: Option<ActionDescription>,
    /// Action set.
    #[serde(default)]
    pub actions: Vec<ActionDescription>,
    /// Action run after the action set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<ActionDescription>,
}

/// One elementary action; an insert without `event` adds an epsilon rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionDescription {
    /// Insert a rule, optionally carrying pre and post calls.
    Insert {
        source: Parameter,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        event: Option<Parameter>,
        destination: Parameter,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pre: Option<CallTemplate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        post: Option<CallTemplate>,
    },
    /// Remove every rule matching the given fields.
    Remove {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<Parameter>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        event: Option<Parameter>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        destination: Option<Parameter>,
    },
}

/// A rule, optionally carrying pre and post calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDescription {
    /// Source state name.
    pub source: String,
    /// Empty for epsilon.
    #[serde(default)]
    pub event: String,
    /// Destination state name.
    pub destination: String,
    /// Call run before the rule fires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre: Option<CallDescription>,
    /// Call run after the rule fires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<CallDescription>,
}

/// A call of a registered function with literal arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallDescription {
    /// Name of the called function.
    pub function: String,
    /// Arguments bound at build time.
    #[serde(default)]
    pub arguments: Vec<Argument>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ActionDescription {
    /// Convert into an engine action, validating parameter kinds.
    pub fn to_action(&self) -> Result<AdaptiveAction, ResolutionError> {
        match self {
            ActionDescription::Insert {
                source,
                event,
                destination,
                pre,
                post,
            } => {
                let mut insert = InsertAction::new(source.clone(), event.clone(), destination.clone())?;
                if let Some(pre) = pre {
                    insert = insert.with_pre(pre.clone());
                }
                if let Some(post) = post {
                    insert = insert.with_post(post.clone());
                }
                Ok(AdaptiveAction::Insert(insert))
            }
            ActionDescription::Remove {
                source,
                event,
                destination,
            } => Ok(AdaptiveAction::Remove(RemoveAction::new(
                source.clone(),
                event.clone(),
                destination.clone(),
            )?)),
        }
    }
}

impl FunctionDescription {
    /// Convert into an engine function.
    pub fn to_function(&self) -> Result<AdaptiveFunction, ResolutionError> {
        let mut function = AdaptiveFunction::new(&self.name).with_generators(self.generators);
        if let Some(pre) = &self.pre {
            function = function.with_pre_action(pre.to_action()?);
        }
        for action in &self.actions {
            function = function.with_action(action.to_action()?);
        }
        if let Some(post) = &self.post {
            function = function.with_post_action(post.to_action()?);
        }
        Ok(function)
    }
}

impl DeviceDescription {
    /// Parse a description from JSON text.
    pub fn from_json(json: &str) -> DescriptionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a description file.
    pub fn load(path: impl AsRef<Path>) -> DescriptionResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| DescriptionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let description = Self::from_json(&json)?;
        info!(path = %path.display(), states = description.states.len(), "device_description_loaded");
        Ok(description)
    }

    /// Render as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> DescriptionResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Separator for inputs of this device, if the description names one.
    pub fn separator(&self) -> Option<&str> {
        self.separator.as_deref()
    }

    /// Build the described device.
    ///
    /// Functions are registered before rules, so rules and actions may refer
    /// to any function regardless of declaration order.
    pub fn build(&self) -> DescriptionResult<AdaptiveDevice<Automaton>> {
        let mut automaton = Automaton::new();
        if let Some(alphabet) = &self.alphabet {
            let symbols: BTreeSet<Symbol> = alphabet.iter().map(|s| Symbol::new(s.as_str())).collect();
            automaton.set_alphabet(Some(symbols));
        }

        let mut initial: Option<&str> = None;
        for state in &self.states {
            if state.initial {
                if let Some(first) = initial {
                    return Err(DescriptionError::MultipleInitialStates {
                        first: first.to_string(),
                        second: state.name.clone(),
                    });
                }
                initial = Some(state.name.as_str());
            }
            automaton
                .add_configuration(State::new(&state.name), state.initial, state.accepting)
                .map_err(DescriptionError::invalid(format!("state `{}`", state.name)))?;
        }
        if initial.is_none() {
            return Err(DescriptionError::NoInitialState);
        }

        let mut device = AdaptiveDevice::new(automaton);
        for function in &self.functions {
            let built = function
                .to_function()
                .map_err(DescriptionError::invalid(format!("function `{}`", function.name)))?;
            device.add_adaptive_function(built);
        }

        for rule in &self.rules {
            let item = || format!("rule ({}, {}, {})", rule.source, rule.event, rule.destination);
            let source = lookup(&device, &rule.source).map_err(DescriptionError::invalid(item()))?;
            let destination =
                lookup(&device, &rule.destination).map_err(DescriptionError::invalid(item()))?;
            let pre = bind(&device, rule.pre.as_ref()).map_err(DescriptionError::invalid(item()))?;
            let post = bind(&device, rule.post.as_ref()).map_err(DescriptionError::invalid(item()))?;
            device
                .add_adaptive_rule(pre, &source, &rule.event, &destination, post)
                .map_err(DescriptionError::invalid(item()))?;
        }

        debug!(
            name = self.name.as_deref().unwrap_or("unnamed"),
            states = self.states.len(),
            functions = self.functions.len(),
            rules = self.rules.len(),
            "device_built"
        );
        Ok(device)
    }
}

fn lookup(device: &AdaptiveDevice<Automaton>, name: &str) -> Result<State, ResolutionError> {
    device
        .configuration(name)
        .ok_or_else(|| ResolutionError::UnknownConfiguration {
            name: name.to_string(),
        })
}

fn bind(
    device: &AdaptiveDevice<Automaton>,
    call: Option<&CallDescription>,
) -> Result<Option<AdaptiveFunctionCall>, ResolutionError> {
    call.map(|c| device.call(&c.function, c.arguments.clone()))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> DeviceDescription {
        DeviceDescription::from_json(
            r#"{
                "states": [
                    { "name": "1", "initial": true },
                    { "name": "2", "accepting": true }
                ],
                "rules": [{ "source": "1", "event": "a", "destination": "2" }]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_minimal_description_builds() {
        let device = minimal().build().unwrap();
        assert_eq!(device.configurations().len(), 2);
        assert_eq!(device.rules().len(), 1);
        assert_eq!(device.initial(), Some(State::new("1")));
    }

    #[test]
    fn test_initial_state_is_required_once() {
        let mut description = minimal();
        description.states[0].initial = false;
        assert!(matches!(
            description.build(),
            Err(DescriptionError::NoInitialState)
        ));

        description.states[0].initial = true;
        description.states[1].initial = true;
        assert!(matches!(
            description.build(),
            Err(DescriptionError::MultipleInitialStates { .. })
        ));
    }

    #[test]
    fn test_unknown_references_are_reported() {
        let mut description = minimal();
        description.rules[0].destination = "9".into();
        let err = description.build().unwrap_err();
        assert!(matches!(
            err,
            DescriptionError::Invalid {
                source: ResolutionError::UnknownConfiguration { .. },
                ..
            }
        ));

        let mut description = minimal();
        description.rules[0].post = Some(CallDescription {
            function: "missing".into(),
            arguments: vec![],
        });
        let err = description.build().unwrap_err();
        assert!(err.to_string().contains("unknown adaptive function: missing"));
    }

    #[test]
    fn test_remove_everything_is_rejected() {
        let mut description = minimal();
        description.functions.push(FunctionDescription {
            name: "wipe".into(),
            generators: 0,
            pre: None,
            actions: vec![ActionDescription::Remove {
                source: None,
                event: None,
                destination: None,
            }],
            post: None,
        });
        let err = description.build().unwrap_err();
        assert!(matches!(
            err,
            DescriptionError::Invalid {
                source: ResolutionError::RemoveEverything,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            DeviceDescription::from_json("{ \"states\": 3 }"),
            Err(DescriptionError::Json(_))
        ));
    }
}
