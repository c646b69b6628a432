//! Registry of adaptive functions and of the calls attached to rules.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::function::{AdaptiveFunction, AdaptiveFunctionCall};
use super::rule::AdaptiveRule;
use crate::device::{Configuration, Device};
use crate::error::ResolutionResult;
use crate::rule::Rule;

/// Authoritative rule table of an adaptive device.
///
/// Wrappers are indexed both by underlying rule and by `(source, event)` key.
/// Every insertion and removal updates the two indices together.
pub struct AdaptiveMechanism<D: Device> {
    functions: BTreeMap<String, Arc<AdaptiveFunction>>,
    by_rule: HashMap<D::Rule, AdaptiveRule<D>>,
    by_key: HashMap<(String, String), D::Rule>,
}

impl<D: Device> Default for AdaptiveMechanism<D> {
    fn default() -> Self {
        Self {
            functions: BTreeMap::new(),
            by_rule: HashMap::new(),
            by_key: HashMap::new(),
        }
    }
}

impl<D: Device> fmt::Debug for AdaptiveMechanism<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptiveMechanism")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("adaptive_rules", &self.by_rule.len())
            .finish()
    }
}

fn key<R: Rule>(rule: &R) -> (String, String) {
    (rule.source().name().to_string(), rule.event().to_string())
}

impl<D: Device> AdaptiveMechanism<D> {
    /// Create an empty mechanism.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function, replacing one with the same name.
    pub fn add_function(&mut self, function: AdaptiveFunction) -> Arc<AdaptiveFunction> {
        let function = Arc::new(function);
        debug!(function = function.name(), "adaptive_function_registered");
        self.functions
            .insert(function.name().to_string(), Arc::clone(&function));
        function
    }

    /// Look up a registered function.
    pub fn function(&self, name: &str) -> Option<Arc<AdaptiveFunction>> {
        self.functions.get(name).cloned()
    }

    /// Registered functions, by name.
    pub fn functions(&self) -> impl Iterator<Item = &AdaptiveFunction> {
        self.functions.values().map(|f| f.as_ref())
    }

    /// Add a rule to `device` and record its wrapper.
    ///
    /// A rule already keyed by `(from, event)` is replaced in the device and
    /// its wrapper dropped here.
    pub fn add_adaptive_rule(
        &mut self,
        device: &mut D,
        pre: Option<AdaptiveFunctionCall>,
        from: &D::Configuration,
        event: &str,
        to: &D::Configuration,
        post: Option<AdaptiveFunctionCall>,
    ) -> ResolutionResult<AdaptiveRule<D>> {
        let rule = device.add_rule(from, event, to)?;
        let key = key(&rule);
        if let Some(replaced) = self.by_key.remove(&key) {
            self.by_rule.remove(&replaced);
        }
        let adaptive = AdaptiveRule::new(rule.clone(), pre, post);
        self.by_rule.insert(rule.clone(), adaptive.clone());
        self.by_key.insert(key, rule);
        Ok(adaptive)
    }

    /// Remove matching rules from `device` and return their wrappers.
    ///
    /// Removed rules without a registered wrapper come back as bare wrappers.
    pub fn remove_rules(
        &mut self,
        device: &mut D,
        from: Option<&D::Configuration>,
        event: Option<&str>,
        to: Option<&D::Configuration>,
    ) -> ResolutionResult<Vec<AdaptiveRule<D>>> {
        let removed = device.remove_rules(from, event, to)?;
        Ok(removed
            .into_iter()
            .map(|rule| {
                let key = key(&rule);
                if self.by_key.get(&key) == Some(&rule) {
                    self.by_key.remove(&key);
                }
                self.by_rule
                    .remove(&rule)
                    .unwrap_or_else(|| AdaptiveRule::bare(rule))
            })
            .collect())
    }

    /// The registered wrapper for a rule.
    pub fn get(&self, rule: &D::Rule) -> Option<&AdaptiveRule<D>> {
        self.by_rule.get(rule)
    }

    /// Wrap an underlying rule, using its registered wrapper when present.
    pub fn wrap(&self, rule: D::Rule) -> AdaptiveRule<D> {
        match self.by_rule.get(&rule) {
            Some(adaptive) => adaptive.clone(),
            None => AdaptiveRule::bare(rule),
        }
    }

    /// All registered wrappers, ordered by source name and event.
    pub fn adaptive_rules(&self) -> Vec<&AdaptiveRule<D>> {
        let mut rules: Vec<_> = self.by_rule.values().collect();
        rules.sort_by(|a, b| key(*a).cmp(&key(*b)));
        rules
    }
}
