//! Deterministic finite automaton implementing the engine's device contract.
//!
//! ```text
//! outgoing: source -> event -> destination     (at most one rule per key)
//! incoming: destination -> {(source, event)}   (back-index for removal)
//! ```
//!
//! Epsilon rules use the empty event key.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use adaptive_engine::{
    apply_rule, Configuration, Device, EngineResult, Event, ExecutionContext, ExecutionError,
    ExecutionErrorKind, InputStream, OutputSymbol, ResolutionError, ResolutionResult, Rule,
    Transition,
};
use tracing::debug;

use crate::state::{State, Symbol};

/// Rule type of an [`Automaton`].
pub type AutomatonRule = Transition<State>;

/// Prefix of generated state names.
pub const GENERATED_PREFIX: &str = "##";

/// A deterministic finite automaton with a mutable rule table.
#[derive(Debug, Clone, Default)]
pub struct Automaton {
    /// States in declaration order.
    states: Vec<State>,
    outgoing: HashMap<String, BTreeMap<String, State>>,
    incoming: HashMap<String, BTreeSet<(String, String)>>,
    initial: Option<State>,
    accepting: BTreeSet<State>,
    alphabet: Option<BTreeSet<Symbol>>,
    next_generated: usize,
}

impl Automaton {
    /// Create an empty automaton with an unconstrained alphabet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the input alphabet.
    pub fn with_alphabet<S: Into<String>>(mut self, symbols: impl IntoIterator<Item = S>) -> Self {
        self.set_alphabet(Some(symbols.into_iter().map(Symbol::new).collect()));
        self
    }

    /// Set or clear the input alphabet.
    pub fn set_alphabet(&mut self, alphabet: Option<BTreeSet<Symbol>>) {
        self.alphabet = alphabet;
    }

    /// Register a state by name and return it.
    ///
    /// Only one state may be registered as initial; use
    /// [`Automaton::set_initial`] to move the initial state.
    pub fn add_state(
        &mut self,
        name: impl Into<String>,
        initial: bool,
        accepting: bool,
    ) -> ResolutionResult<State> {
        let state = State::new(name);
        self.add_configuration(state.clone(), initial, accepting)?;
        Ok(state)
    }

    /// Make a registered state the initial one.
    pub fn set_initial(&mut self, state: &State) -> ResolutionResult<()> {
        self.require(state)?;
        self.initial = Some(state.clone());
        Ok(())
    }

    /// Replace the accepting set. Every state must be registered.
    pub fn set_accepting(&mut self, states: impl IntoIterator<Item = State>) -> ResolutionResult<()> {
        let accepting: BTreeSet<State> = states.into_iter().collect();
        for state in &accepting {
            self.require(state)?;
        }
        self.accepting = accepting;
        Ok(())
    }

    /// Destination of the rule keyed by `(from, event)`.
    pub fn target(&self, from: &str, event: &str) -> Option<&State> {
        self.outgoing.get(from)?.get(event)
    }

    /// Rules leaving `from`, ordered by event.
    pub fn rules_from(&self, from: &State) -> Vec<AutomatonRule> {
        self.outgoing
            .get(from.name())
            .map(|table| {
                table
                    .iter()
                    .map(|(event, to)| Transition::new(from.clone(), event.clone(), to.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn contains(&self, name: &str) -> bool {
        self.outgoing.contains_key(name)
    }

    fn require(&self, state: &State) -> ResolutionResult<()> {
        if self.contains(state.name()) {
            Ok(())
        } else {
            Err(ResolutionError::UnknownConfiguration {
                name: state.name().to_string(),
            })
        }
    }

    fn unlink(&mut self, from: &State, event: &str) -> Option<AutomatonRule> {
        let to = self.outgoing.get_mut(from.name())?.remove(event)?;
        if let Some(back) = self.incoming.get_mut(to.name()) {
            back.remove(&(from.name().to_string(), event.to_string()));
        }
        Some(Transition::new(from.clone(), event, to))
    }
}

impl Device for Automaton {
    type Configuration = State;
    type Event = Symbol;
    type Rule = AutomatonRule;
    type Context = AutomatonContext;

    fn configurations(&self) -> Vec<State> {
        self.states.clone()
    }

    fn configuration(&self, name: &str) -> Option<State> {
        self.contains(name).then(|| State::new(name))
    }

    fn initial(&self) -> Option<State> {
        self.initial.clone()
    }

    fn accepting(&self) -> Vec<State> {
        self.states
            .iter()
            .filter(|s| self.accepting.contains(*s))
            .cloned()
            .collect()
    }

    fn is_accepting(&self, configuration: &State) -> bool {
        self.accepting.contains(configuration)
    }

    fn events(&self) -> Option<Vec<Symbol>> {
        self.alphabet.as_ref().map(|a| a.iter().cloned().collect())
    }

    fn rules(&self) -> Vec<AutomatonRule> {
        self.states.iter().flat_map(|s| self.rules_from(s)).collect()
    }

    fn start(&self) -> EngineResult<AutomatonContext> {
        let current = self
            .initial
            .clone()
            .ok_or_else(|| ExecutionError::new(ExecutionErrorKind::MissingInitialConfiguration))?;
        Ok(AutomatonContext {
            current,
            output: None,
        })
    }

    fn create_configuration(&mut self) -> State {
        loop {
            let name = format!("{GENERATED_PREFIX}{}", self.next_generated);
            self.next_generated += 1;
            if !self.contains(&name) {
                let state = State::new(name);
                self.states.push(state.clone());
                self.outgoing.insert(state.name().to_string(), BTreeMap::new());
                debug!(state = %state, "state_generated");
                return state;
            }
        }
    }

    fn add_configuration(
        &mut self,
        configuration: State,
        initial: bool,
        accepting: bool,
    ) -> ResolutionResult<()> {
        if configuration.name().is_empty() {
            return Err(ResolutionError::InvalidConfigurationName);
        }
        if self.contains(configuration.name()) {
            return Err(ResolutionError::DuplicateConfiguration {
                name: configuration.name().to_string(),
            });
        }
        if let (true, Some(existing)) = (initial, &self.initial) {
            return Err(ResolutionError::DuplicateInitialConfiguration {
                existing: existing.name().to_string(),
                name: configuration.name().to_string(),
            });
        }
        self.outgoing
            .insert(configuration.name().to_string(), BTreeMap::new());
        self.states.push(configuration.clone());
        if initial {
            self.initial = Some(configuration.clone());
        }
        if accepting {
            self.accepting.insert(configuration);
        }
        Ok(())
    }

    fn add_rule(&mut self, from: &State, event: &str, to: &State) -> ResolutionResult<AutomatonRule> {
        self.require(from)?;
        self.require(to)?;
        self.unlink(from, event);
        if let Some(table) = self.outgoing.get_mut(from.name()) {
            table.insert(event.to_string(), to.clone());
        }
        self.incoming
            .entry(to.name().to_string())
            .or_default()
            .insert((from.name().to_string(), event.to_string()));
        let rule = Transition::new(from.clone(), event, to.clone());
        debug!(rule = %rule, "rule_added");
        Ok(rule)
    }

    fn remove_rules(
        &mut self,
        from: Option<&State>,
        event: Option<&str>,
        to: Option<&State>,
    ) -> ResolutionResult<Vec<AutomatonRule>> {
        if from.is_none() && event.is_none() && to.is_none() {
            return Err(ResolutionError::RemoveEverything);
        }

        // Pick the narrowest index for the candidate set, then filter.
        let candidates: Vec<AutomatonRule> = match (from, to) {
            (Some(from), _) => self.rules_from(from),
            (None, Some(to)) => self
                .incoming
                .get(to.name())
                .map(|back| {
                    back.iter()
                        .map(|(source, event)| Transition::new(State::new(source), event.clone(), to.clone()))
                        .collect()
                })
                .unwrap_or_default(),
            (None, None) => self.rules(),
        };

        let matching: Vec<AutomatonRule> = candidates
            .into_iter()
            .filter(|rule| {
                event.map_or(true, |e| rule.event() == e)
                    && to.map_or(true, |t| rule.destination() == t)
            })
            .collect();

        let mut removed = Vec::with_capacity(matching.len());
        for rule in matching {
            if let Some(rule) = self.unlink(rule.source(), rule.event()) {
                debug!(rule = %rule, "rule_removed");
                removed.push(rule);
            }
        }
        Ok(removed)
    }

    fn rule_exists(&self, rule: &AutomatonRule) -> bool {
        self.target(rule.source().name(), rule.event()) == Some(rule.destination())
    }
}

/// Per-run state of an [`Automaton`].
#[derive(Debug, Clone)]
pub struct AutomatonContext {
    current: State,
    output: Option<OutputSymbol>,
}

impl AutomatonContext {
    fn ensure_running(&self) -> EngineResult<()> {
        if self.output.is_some() {
            return Err(
                ExecutionError::new(ExecutionErrorKind::Terminated).with_configuration(&self.current)
            );
        }
        Ok(())
    }
}

impl ExecutionContext<Automaton> for AutomatonContext {
    fn current(&self) -> &State {
        &self.current
    }

    fn change_configuration(&mut self, next: State) -> EngineResult<()> {
        self.ensure_running()?;
        self.current = next;
        Ok(())
    }

    fn apply(
        &mut self,
        device: &mut Automaton,
        input: &mut dyn InputStream<Event = Symbol>,
        rule: &AutomatonRule,
    ) -> EngineResult<State> {
        self.ensure_running()?;
        if let (false, Some(alphabet), Some(next)) = (rule.is_epsilon(), &device.alphabet, input.peek()) {
            if !alphabet.contains(next) {
                return Err(ExecutionError::new(ExecutionErrorKind::InvalidSymbol {
                    symbol: next.symbol().to_string(),
                })
                .with_configuration(&self.current)
                .with_rule(rule)
                .with_input(&*input));
            }
        }
        apply_rule::<Automaton, _>(rule, input, self)
    }

    fn rules_for(&self, device: &Automaton, event: Option<&Symbol>) -> Vec<AutomatonRule> {
        let key = event.map_or("", |e| e.symbol());
        device
            .target(self.current.name(), key)
            .map(|to| vec![Transition::new(self.current.clone(), key, to.clone())])
            .unwrap_or_default()
    }

    fn terminate(&mut self, device: &Automaton, fully_consumed: bool) {
        let accepted = fully_consumed && device.is_accepting(&self.current);
        self.output = Some(if accepted {
            OutputSymbol::Accept
        } else {
            OutputSymbol::Reject
        });
    }

    fn is_terminated(&self) -> bool {
        self.output.is_some()
    }

    fn output(&self) -> Option<OutputSymbol> {
        self.output
    }
}
