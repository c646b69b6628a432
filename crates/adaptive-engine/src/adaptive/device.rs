//! The adaptive decorator over a plain device and its execution context.

use std::fmt;
use std::sync::Arc;

use super::function::{AdaptiveFunction, AdaptiveFunctionCall};
use super::mechanism::AdaptiveMechanism;
use super::parameter::Argument;
use super::rule::AdaptiveRule;
use crate::device::{Device, ExecutionContext, OutputSymbol};
use crate::error::{EngineResult, ResolutionError, ResolutionResult};
use crate::input::InputStream;

/// A plain device whose rules may carry adaptive function calls.
///
/// Every rule handed out is an [`AdaptiveRule`]; rules added without calls
/// come back as bare wrappers. Rule-table edits go through the mechanism so
/// both stay in step.
pub struct AdaptiveDevice<D: Device> {
    underlying: D,
    mechanism: AdaptiveMechanism<D>,
}

impl<D: Device> AdaptiveDevice<D> {
    /// Wrap a device. Rules it already holds become bare adaptive rules.
    pub fn new(underlying: D) -> Self {
        Self {
            underlying,
            mechanism: AdaptiveMechanism::new(),
        }
    }

    /// Get the wrapped device.
    pub fn underlying(&self) -> &D {
        &self.underlying
    }

    /// Mutable access to the wrapped device. Rules edited here bypass the
    /// mechanism, so a replaced rule keeps its stale wrapper until it is
    /// redefined through [`AdaptiveDevice::add_adaptive_rule`].
    pub fn underlying_mut(&mut self) -> &mut D {
        &mut self.underlying
    }

    /// Get the adaptive mechanism.
    pub fn mechanism(&self) -> &AdaptiveMechanism<D> {
        &self.mechanism
    }

    /// Unwrap the plain device, dropping every attached call.
    pub fn into_inner(self) -> D {
        self.underlying
    }

    /// Register an adaptive function, replacing one with the same name.
    pub fn add_adaptive_function(&mut self, function: AdaptiveFunction) -> Arc<AdaptiveFunction> {
        self.mechanism.add_function(function)
    }

    /// Look up a registered adaptive function.
    pub fn function(&self, name: &str) -> Option<Arc<AdaptiveFunction>> {
        self.mechanism.function(name)
    }

    /// Bind a registered function to arguments.
    pub fn call(&self, name: &str, arguments: Vec<Argument>) -> ResolutionResult<AdaptiveFunctionCall> {
        let function = self
            .mechanism
            .function(name)
            .ok_or_else(|| ResolutionError::UnknownFunction {
                name: name.to_string(),
            })?;
        Ok(AdaptiveFunctionCall::new(function, arguments))
    }

    /// Add a rule with optional pre and post calls, replacing any rule keyed
    /// by `(from, event)`.
    pub fn add_adaptive_rule(
        &mut self,
        pre: Option<AdaptiveFunctionCall>,
        from: &D::Configuration,
        event: &str,
        to: &D::Configuration,
        post: Option<AdaptiveFunctionCall>,
    ) -> ResolutionResult<AdaptiveRule<D>> {
        self.mechanism
            .add_adaptive_rule(&mut self.underlying, pre, from, event, to, post)
    }

    /// Rules currently in the device that carry a pre or post call.
    pub fn adaptive_rules(&self) -> Vec<AdaptiveRule<D>> {
        self.mechanism
            .adaptive_rules()
            .into_iter()
            .filter(|r| !r.is_bare() && self.underlying.rule_exists(r.underlying()))
            .cloned()
            .collect()
    }
}

impl<D: Device + fmt::Debug> fmt::Debug for AdaptiveDevice<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptiveDevice")
            .field("underlying", &self.underlying)
            .field("mechanism", &self.mechanism)
            .finish()
    }
}

impl<D: Device> Device for AdaptiveDevice<D> {
    type Configuration = D::Configuration;
    type Event = D::Event;
    type Rule = AdaptiveRule<D>;
    type Context = AdaptiveContext<D>;

    fn configurations(&self) -> Vec<D::Configuration> {
        self.underlying.configurations()
    }

    fn configuration(&self, name: &str) -> Option<D::Configuration> {
        self.underlying.configuration(name)
    }

    fn initial(&self) -> Option<D::Configuration> {
        self.underlying.initial()
    }

    fn accepting(&self) -> Vec<D::Configuration> {
        self.underlying.accepting()
    }

    fn is_accepting(&self, configuration: &D::Configuration) -> bool {
        self.underlying.is_accepting(configuration)
    }

    fn events(&self) -> Option<Vec<D::Event>> {
        self.underlying.events()
    }

    fn output_symbols(&self) -> &[OutputSymbol] {
        self.underlying.output_symbols()
    }

    fn rules(&self) -> Vec<AdaptiveRule<D>> {
        self.underlying
            .rules()
            .into_iter()
            .map(|rule| self.mechanism.wrap(rule))
            .collect()
    }

    fn start(&self) -> EngineResult<AdaptiveContext<D>> {
        Ok(AdaptiveContext {
            inner: self.underlying.start()?,
        })
    }

    fn create_configuration(&mut self) -> D::Configuration {
        self.underlying.create_configuration()
    }

    fn add_configuration(
        &mut self,
        configuration: D::Configuration,
        initial: bool,
        accepting: bool,
    ) -> ResolutionResult<()> {
        self.underlying
            .add_configuration(configuration, initial, accepting)
    }

    fn add_rule(
        &mut self,
        from: &D::Configuration,
        event: &str,
        to: &D::Configuration,
    ) -> ResolutionResult<AdaptiveRule<D>> {
        self.add_adaptive_rule(None, from, event, to, None)
    }

    fn remove_rules(
        &mut self,
        from: Option<&D::Configuration>,
        event: Option<&str>,
        to: Option<&D::Configuration>,
    ) -> ResolutionResult<Vec<AdaptiveRule<D>>> {
        self.mechanism
            .remove_rules(&mut self.underlying, from, event, to)
    }

    fn rule_exists(&self, rule: &AdaptiveRule<D>) -> bool {
        self.underlying.rule_exists(rule.underlying())
    }
}

/// Execution context of an adaptive device, wrapping the plain context.
pub struct AdaptiveContext<D: Device> {
    pub(crate) inner: D::Context,
}

impl<D: Device> AdaptiveContext<D> {
    /// The wrapped plain context.
    pub fn inner(&self) -> &D::Context {
        &self.inner
    }
}

impl<D: Device> ExecutionContext<AdaptiveDevice<D>> for AdaptiveContext<D> {
    fn current(&self) -> &D::Configuration {
        self.inner.current()
    }

    fn change_configuration(&mut self, next: D::Configuration) -> EngineResult<()> {
        self.inner.change_configuration(next)
    }

    fn apply(
        &mut self,
        device: &mut AdaptiveDevice<D>,
        input: &mut dyn InputStream<Event = D::Event>,
        rule: &AdaptiveRule<D>,
    ) -> EngineResult<D::Configuration> {
        rule.apply(device, self, input)
    }

    fn rules_for(&self, device: &AdaptiveDevice<D>, event: Option<&D::Event>) -> Vec<AdaptiveRule<D>> {
        self.inner
            .rules_for(&device.underlying, event)
            .into_iter()
            .map(|rule| device.mechanism.wrap(rule))
            .collect()
    }

    fn terminate(&mut self, device: &AdaptiveDevice<D>, fully_consumed: bool) {
        self.inner.terminate(&device.underlying, fully_consumed);
    }

    fn is_terminated(&self) -> bool {
        self.inner.is_terminated()
    }

    fn output(&self) -> Option<OutputSymbol> {
        self.inner.output()
    }
}
