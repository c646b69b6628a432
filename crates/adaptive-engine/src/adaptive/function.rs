//! Adaptive functions and their bound invocations.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::action::AdaptiveAction;
use super::device::AdaptiveDevice;
use super::parameter::Argument;
use crate::device::{Configuration, Device};
use crate::error::ResolutionResult;

/// A named bundle of adaptive actions plus a generator count.
///
/// Execution order within one invocation:
///
/// ```text
/// generators := N fresh configurations
/// pre action
/// every removal, in declaration order
/// every insertion, in declaration order
/// post action
/// ```
///
/// Removing first keeps an insertion from being shadowed by a removal that
/// targets the same `(source, event)` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdaptiveFunction {
    name: String,
    generators: usize,
    pre: Option<AdaptiveAction>,
    actions: Vec<AdaptiveAction>,
    post: Option<AdaptiveAction>,
}

impl AdaptiveFunction {
    /// Create an empty function without generators.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generators: 0,
            pre: None,
            actions: Vec::new(),
            post: None,
        }
    }

    /// Set the number of configurations generated per invocation.
    pub fn with_generators(mut self, generators: usize) -> Self {
        self.generators = generators;
        self
    }

    /// Add an action to the action set.
    pub fn with_action(mut self, action: AdaptiveAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Add several actions to the action set.
    pub fn with_actions(mut self, actions: impl IntoIterator<Item = AdaptiveAction>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Set the action run before the action set.
    pub fn with_pre_action(mut self, action: AdaptiveAction) -> Self {
        self.pre = Some(action);
        self
    }

    /// Set the action run after the action set.
    pub fn with_post_action(mut self, action: AdaptiveAction) -> Self {
        self.post = Some(action);
        self
    }

    /// Get the function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of configurations generated per invocation.
    pub fn generators(&self) -> usize {
        self.generators
    }

    /// Get the action set, in declaration order.
    pub fn actions(&self) -> &[AdaptiveAction] {
        &self.actions
    }

    /// Get the action run before the action set.
    pub fn pre_action(&self) -> Option<&AdaptiveAction> {
        self.pre.as_ref()
    }

    /// Get the action run after the action set.
    pub fn post_action(&self) -> Option<&AdaptiveAction> {
        self.post.as_ref()
    }

    /// Run the function against `device` with the given call arguments.
    ///
    /// Generated configurations stay registered even if an action fails.
    pub fn execute<D: Device>(
        &self,
        arguments: &[Argument],
        device: &mut AdaptiveDevice<D>,
    ) -> ResolutionResult<()> {
        let generators: Vec<D::Configuration> = (0..self.generators)
            .map(|_| device.create_configuration())
            .collect();
        debug!(
            function = %self.name,
            generated = ?generators.iter().map(|c| c.name()).collect::<Vec<_>>(),
            "adaptive_function_start"
        );

        if let Some(pre) = &self.pre {
            pre.execute(arguments, &generators, device)?;
        }
        for action in self.actions.iter().filter(|a| a.is_removal()) {
            action.execute(arguments, &generators, device)?;
        }
        for action in self.actions.iter().filter(|a| !a.is_removal()) {
            action.execute(arguments, &generators, device)?;
        }
        if let Some(post) = &self.post {
            post.execute(arguments, &generators, device)?;
        }

        debug!(function = %self.name, "adaptive_function_complete");
        Ok(())
    }
}

/// A function bound to concrete arguments, attached to a rule as its pre or
/// post call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdaptiveFunctionCall {
    function: Arc<AdaptiveFunction>,
    arguments: Vec<Argument>,
}

impl AdaptiveFunctionCall {
    /// Create a new call binding `function` to `arguments`.
    pub fn new(function: Arc<AdaptiveFunction>, arguments: Vec<Argument>) -> Self {
        Self {
            function,
            arguments,
        }
    }

    /// Get the called function.
    pub fn function(&self) -> &AdaptiveFunction {
        &self.function
    }

    /// Get the bound arguments.
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Run the bound function.
    pub fn execute<D: Device>(&self, device: &mut AdaptiveDevice<D>) -> ResolutionResult<()> {
        self.function.execute(&self.arguments, device)
    }
}

impl fmt::Display for AdaptiveFunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function.name)?;
        for (i, argument) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{argument}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptive::{InsertAction, Parameter, RemoveAction};
    use crate::test_fixtures::adaptive;

    fn insert(source: Parameter, event: &str, destination: Parameter) -> AdaptiveAction {
        AdaptiveAction::Insert(
            InsertAction::new(source, Some(Parameter::event(event)), destination).unwrap(),
        )
    }

    #[test]
    fn test_generators_are_created_per_invocation() {
        let mut device = adaptive(&[("1", true, false)]);
        let function = AdaptiveFunction::new("grow")
            .with_generators(2)
            .with_action(insert(Parameter::generator(0), "a", Parameter::generator(1)));

        function.execute(&[], &mut device).unwrap();
        function.execute(&[], &mut device).unwrap();

        assert_eq!(device.configurations().len(), 5);
        assert_eq!(device.rules().len(), 2);
    }

    #[test]
    fn test_removals_run_before_insertions() {
        let mut device = adaptive(&[("1", true, false), ("2", false, true)]);
        // Declared insert-first; a declaration-order policy would lose the rule.
        let function = AdaptiveFunction::new("swap")
            .with_action(insert(
                Parameter::configuration("1"),
                "a",
                Parameter::configuration("2"),
            ))
            .with_action(AdaptiveAction::Remove(
                RemoveAction::new(
                    Some(Parameter::configuration("1")),
                    Some(Parameter::event("a")),
                    None,
                )
                .unwrap(),
            ));

        function.execute(&[], &mut device).unwrap();

        assert_eq!(device.underlying().target("1", "a"), Some("2"));
    }

    #[test]
    fn test_pre_and_post_actions_bracket_the_set() {
        let mut device = adaptive(&[("1", true, false), ("2", false, true)]);
        let function = AdaptiveFunction::new("bracket")
            .with_pre_action(insert(
                Parameter::configuration("1"),
                "a",
                Parameter::configuration("1"),
            ))
            .with_action(AdaptiveAction::Remove(
                RemoveAction::new(None, Some(Parameter::event("a")), None).unwrap(),
            ))
            .with_post_action(insert(
                Parameter::configuration("1"),
                "b",
                Parameter::configuration("2"),
            ));

        function.execute(&[], &mut device).unwrap();

        assert_eq!(device.underlying().target("1", "a"), None);
        assert_eq!(device.underlying().target("1", "b"), Some("2"));
    }

    #[test]
    fn test_call_renders_arguments() {
        let call = AdaptiveFunctionCall::new(
            Arc::new(AdaptiveFunction::new("f")),
            vec![Argument::configuration("2"), Argument::event("a")],
        );
        assert_eq!(call.to_string(), "f(2, 'a')");
    }
}
