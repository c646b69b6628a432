//! Rules carrying pre/post adaptive function calls.

use std::fmt;
use std::hash::{Hash, Hasher};

use tracing::info;

use super::device::{AdaptiveContext, AdaptiveDevice};
use super::function::AdaptiveFunctionCall;
use crate::device::{Device, ExecutionContext};
use crate::error::{EngineResult, ExecutionError, ResolutionError};
use crate::input::InputStream;
use crate::rule::Rule;

/// An underlying rule plus optional pre and post calls.
///
/// Identity is the underlying rule's triple. A wrapper whose underlying rule
/// has been removed from the device is stale; staleness is checked against the
/// device, never stored.
pub struct AdaptiveRule<D: Device> {
    rule: D::Rule,
    pre: Option<AdaptiveFunctionCall>,
    post: Option<AdaptiveFunctionCall>,
}

impl<D: Device> AdaptiveRule<D> {
    /// Create a new adaptive rule.
    pub fn new(
        rule: D::Rule,
        pre: Option<AdaptiveFunctionCall>,
        post: Option<AdaptiveFunctionCall>,
    ) -> Self {
        Self { rule, pre, post }
    }

    /// Wrapper without calls.
    pub fn bare(rule: D::Rule) -> Self {
        Self::new(rule, None, None)
    }

    /// Get the wrapped plain rule.
    pub fn underlying(&self) -> &D::Rule {
        &self.rule
    }

    /// Get the call run before the rule fires.
    pub fn pre(&self) -> Option<&AdaptiveFunctionCall> {
        self.pre.as_ref()
    }

    /// Get the call run after the rule fires.
    pub fn post(&self) -> Option<&AdaptiveFunctionCall> {
        self.post.as_ref()
    }

    /// Check if the wrapper carries no calls.
    pub fn is_bare(&self) -> bool {
        self.pre.is_none() && self.post.is_none()
    }

    /// Apply the rule: pre call, existence check, underlying rule, post call.
    ///
    /// If the pre call removed the underlying rule, nothing else happens and
    /// the source configuration is returned; no input is consumed.
    pub fn apply(
        &self,
        device: &mut AdaptiveDevice<D>,
        context: &mut AdaptiveContext<D>,
        input: &mut dyn InputStream<Event = D::Event>,
    ) -> EngineResult<D::Configuration> {
        if let Some(pre) = &self.pre {
            info!(rule = %self.rule, call = %pre, "running_pre_call");
            pre.execute(device).map_err(|e| self.fail(e, &*input))?;
        }

        if !device.underlying().rule_exists(&self.rule) {
            info!(rule = %self.rule, "rule_removed_before_application");
            return Ok(self.rule.source().clone());
        }

        let next = context
            .inner
            .apply(device.underlying_mut(), input, &self.rule)?;

        if let Some(post) = &self.post {
            info!(rule = %self.rule, call = %post, "running_post_call");
            post.execute(device).map_err(|e| self.fail(e, &*input))?;
        }
        Ok(next)
    }

    fn fail(
        &self,
        err: ResolutionError,
        input: &dyn InputStream<Event = D::Event>,
    ) -> ExecutionError {
        ExecutionError::from(err)
            .with_configuration(self.rule.source())
            .with_rule(&self.rule)
            .with_input(input)
    }
}

impl<D: Device> Clone for AdaptiveRule<D> {
    fn clone(&self) -> Self {
        Self {
            rule: self.rule.clone(),
            pre: self.pre.clone(),
            post: self.post.clone(),
        }
    }
}

impl<D: Device> PartialEq for AdaptiveRule<D> {
    fn eq(&self, other: &Self) -> bool {
        self.rule == other.rule
    }
}

impl<D: Device> Eq for AdaptiveRule<D> {}

impl<D: Device> Hash for AdaptiveRule<D> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rule.hash(state);
    }
}

impl<D: Device> fmt::Debug for AdaptiveRule<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptiveRule")
            .field("rule", &self.rule)
            .field("pre", &self.pre.as_ref().map(|c| c.to_string()))
            .field("post", &self.post.as_ref().map(|c| c.to_string()))
            .finish()
    }
}

impl<D: Device> fmt::Display for AdaptiveRule<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pre) = &self.pre {
            write!(f, "{pre} . ")?;
        }
        write!(f, "{}", self.rule)?;
        if let Some(post) = &self.post {
            write!(f, " . {post}")?;
        }
        Ok(())
    }
}

impl<D: Device> Rule for AdaptiveRule<D> {
    type Configuration = D::Configuration;

    fn source(&self) -> &D::Configuration {
        self.rule.source()
    }

    fn event(&self) -> &str {
        self.rule.event()
    }

    fn destination(&self) -> &D::Configuration {
        self.rule.destination()
    }
}
