//! Elementary adaptive actions: rule insertion and rule removal.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::device::AdaptiveDevice;
use super::function::AdaptiveFunctionCall;
use super::parameter::{Argument, Parameter, ParameterKind, Resolver};
use crate::device::Device;
use crate::error::{ResolutionError, ResolutionResult};
use crate::rule::EPSILON;

/// A named function call whose parameters are resolved against the enclosing
/// invocation when the action runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTemplate {
    /// Name of the registered adaptive function.
    pub function: String,
    /// Secondary parameter list.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl CallTemplate {
    /// Create a new call template.
    pub fn new(function: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            function: function.into(),
            parameters,
        }
    }

    fn bind<D: Device>(
        &self,
        resolver: &Resolver<'_, AdaptiveDevice<D>>,
        device: &AdaptiveDevice<D>,
    ) -> ResolutionResult<AdaptiveFunctionCall> {
        let arguments = self
            .parameters
            .iter()
            .map(|p| resolver.argument(p))
            .collect::<ResolutionResult<Vec<_>>>()?;
        device.call(&self.function, arguments)
    }
}

impl fmt::Display for CallTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function)?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{parameter}")?;
        }
        f.write_str(")")
    }
}

/// Adds a rule, optionally carrying pre/post calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertAction {
    source: Parameter,
    event: Option<Parameter>,
    destination: Parameter,
    pre: Option<CallTemplate>,
    post: Option<CallTemplate>,
}

impl InsertAction {
    /// Create an insertion. A missing event inserts an epsilon rule.
    pub fn new(
        source: Parameter,
        event: Option<Parameter>,
        destination: Parameter,
    ) -> ResolutionResult<Self> {
        check_configuration("source", &source)?;
        check_configuration("destination", &destination)?;
        if let Some(event) = &event {
            check_event(event)?;
        }
        Ok(Self {
            source,
            event,
            destination,
            pre: None,
            post: None,
        })
    }

    /// Attach a call run before the inserted rule fires.
    pub fn with_pre(mut self, call: CallTemplate) -> Self {
        self.pre = Some(call);
        self
    }

    /// Attach a call run after the inserted rule fires.
    pub fn with_post(mut self, call: CallTemplate) -> Self {
        self.post = Some(call);
        self
    }

    /// Get the source parameter.
    pub fn source(&self) -> &Parameter {
        &self.source
    }

    /// Get the event parameter; `None` inserts an epsilon rule.
    pub fn event(&self) -> Option<&Parameter> {
        self.event.as_ref()
    }

    /// Get the destination parameter.
    pub fn destination(&self) -> &Parameter {
        &self.destination
    }

    /// Get the call attached as the inserted rule's pre call.
    pub fn pre(&self) -> Option<&CallTemplate> {
        self.pre.as_ref()
    }

    /// Get the call attached as the inserted rule's post call.
    pub fn post(&self) -> Option<&CallTemplate> {
        self.post.as_ref()
    }
}

/// Removes every rule matching the given fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveAction {
    source: Option<Parameter>,
    event: Option<Parameter>,
    destination: Option<Parameter>,
}

impl RemoveAction {
    /// Create a removal. Omitted fields match anything; at least one field
    /// must be given.
    pub fn new(
        source: Option<Parameter>,
        event: Option<Parameter>,
        destination: Option<Parameter>,
    ) -> ResolutionResult<Self> {
        if source.is_none() && event.is_none() && destination.is_none() {
            return Err(ResolutionError::RemoveEverything);
        }
        if let Some(source) = &source {
            check_configuration("source", source)?;
        }
        if let Some(event) = &event {
            check_event(event)?;
        }
        if let Some(destination) = &destination {
            check_configuration("destination", destination)?;
        }
        Ok(Self {
            source,
            event,
            destination,
        })
    }

    /// Get the source filter.
    pub fn source(&self) -> Option<&Parameter> {
        self.source.as_ref()
    }

    /// Get the event filter.
    pub fn event(&self) -> Option<&Parameter> {
        self.event.as_ref()
    }

    /// Get the destination filter.
    pub fn destination(&self) -> Option<&Parameter> {
        self.destination.as_ref()
    }
}

fn check_configuration(role: &'static str, parameter: &Parameter) -> ResolutionResult<()> {
    if parameter.denotes_configuration() {
        Ok(())
    } else {
        Err(ResolutionError::InvalidParameter {
            role,
            kind: parameter.kind(),
        })
    }
}

fn check_event(parameter: &Parameter) -> ResolutionResult<()> {
    match parameter.kind() {
        ParameterKind::Event => Ok(()),
        kind => Err(ResolutionError::InvalidParameter {
            role: "event",
            kind,
        }),
    }
}

/// An elementary adaptive action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdaptiveAction {
    /// Add a rule.
    Insert(InsertAction),
    /// Remove matching rules.
    Remove(RemoveAction),
}

impl AdaptiveAction {
    /// Check if this is a removal.
    pub fn is_removal(&self) -> bool {
        matches!(self, AdaptiveAction::Remove(_))
    }

    /// Resolve parameters and mutate the device's rule table.
    pub fn execute<D: Device>(
        &self,
        arguments: &[Argument],
        generators: &[D::Configuration],
        device: &mut AdaptiveDevice<D>,
    ) -> ResolutionResult<()> {
        match self {
            AdaptiveAction::Insert(insert) => {
                let (source, event, destination, pre, post) = {
                    let view: &AdaptiveDevice<D> = device;
                    let resolver = Resolver::new(arguments, generators, view);
                    let source = resolver.configuration(&insert.source)?;
                    let event = match &insert.event {
                        Some(event) => resolver.event(event)?,
                        None => EPSILON.to_string(),
                    };
                    let destination = resolver.configuration(&insert.destination)?;
                    let pre = match &insert.pre {
                        Some(call) => Some(call.bind(&resolver, view)?),
                        None => None,
                    };
                    let post = match &insert.post {
                        Some(call) => Some(call.bind(&resolver, view)?),
                        None => None,
                    };
                    (source, event, destination, pre, post)
                };
                let rule = device.add_adaptive_rule(pre, &source, &event, &destination, post)?;
                debug!(rule = %rule, "adaptive_rule_inserted");
            }
            AdaptiveAction::Remove(remove) => {
                let (source, event, destination) = {
                    let resolver = Resolver::new(arguments, generators, &*device);
                    let source = remove
                        .source
                        .as_ref()
                        .map(|p| resolver.configuration(p))
                        .transpose()?;
                    let event = remove
                        .event
                        .as_ref()
                        .map(|p| resolver.event(p))
                        .transpose()?;
                    let destination = remove
                        .destination
                        .as_ref()
                        .map(|p| resolver.configuration(p))
                        .transpose()?;
                    (source, event, destination)
                };
                let removed = device.remove_rules(
                    source.as_ref(),
                    event.as_deref(),
                    destination.as_ref(),
                )?;
                debug!(removed = removed.len(), "adaptive_rules_removed");
            }
        }
        Ok(())
    }
}

impl fmt::Display for AdaptiveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn field(f: &mut fmt::Formatter<'_>, parameter: Option<&Parameter>) -> fmt::Result {
            match parameter {
                Some(parameter) => write!(f, "{parameter}"),
                None => f.write_str("*"),
            }
        }

        match self {
            AdaptiveAction::Insert(insert) => {
                f.write_str("+(")?;
                write!(f, "{}, ", insert.source)?;
                match &insert.event {
                    Some(event) => write!(f, "{event}")?,
                    None => f.write_str("ε")?,
                }
                write!(f, ", {})", insert.destination)?;
                if let Some(pre) = &insert.pre {
                    write!(f, " pre {pre}")?;
                }
                if let Some(post) = &insert.post {
                    write!(f, " post {post}")?;
                }
                Ok(())
            }
            AdaptiveAction::Remove(remove) => {
                f.write_str("-(")?;
                field(f, remove.source.as_ref())?;
                f.write_str(", ")?;
                field(f, remove.event.as_ref())?;
                f.write_str(", ")?;
                field(f, remove.destination.as_ref())?;
                f.write_str(")")
            }
        }
    }
}
