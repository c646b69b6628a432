//! Minimal in-memory device for unit tests.
//!
//! A map-backed deterministic device with per-character input, enough to
//! exercise the executor and the adaptive layer without a real substrate.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::adaptive::AdaptiveDevice;
use crate::device::{Configuration, Device, Event, ExecutionContext, OutputSymbol};
use crate::error::{EngineResult, ExecutionError, ExecutionErrorKind, ResolutionError, ResolutionResult};
use crate::input::InputStream;
use crate::rule::{apply_rule, Transition};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node(String);

impl Node {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl Configuration for Node {
    fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sym(String);

impl Event for Sym {
    fn symbol(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct TextInput {
    symbols: Vec<Sym>,
    position: usize,
}

/// One symbol per character.
pub fn input(text: &str) -> TextInput {
    TextInput {
        symbols: text.chars().map(|c| Sym(c.to_string())).collect(),
        position: 0,
    }
}

impl InputStream for TextInput {
    type Event = Sym;

    fn has_next(&self) -> bool {
        self.position < self.symbols.len()
    }

    fn peek(&self) -> Option<&Sym> {
        self.symbols.get(self.position)
    }

    fn consume(&mut self) -> Option<Sym> {
        let next = self.symbols.get(self.position).cloned();
        if next.is_some() {
            self.position += 1;
        }
        next
    }

    fn original(&self) -> Vec<Sym> {
        self.symbols.clone()
    }

    fn consumed(&self) -> Vec<Sym> {
        self.symbols[..self.position].to_vec()
    }

    fn remaining(&self) -> Vec<Sym> {
        self.symbols[self.position..].to_vec()
    }

    fn separator(&self) -> &str {
        ""
    }
}

#[derive(Debug, Default)]
pub struct TableDevice {
    nodes: BTreeSet<Node>,
    initial: Option<Node>,
    accepting: BTreeSet<Node>,
    table: BTreeMap<(Node, String), Node>,
    generated: usize,
}

impl TableDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&mut self, name: &str, initial: bool, accepting: bool) {
        self.add_configuration(Node::new(name), initial, accepting)
            .expect("fresh state");
    }

    pub fn rule(&mut self, from: &str, event: &str, to: &str) {
        self.add_rule(&Node::new(from), event, &Node::new(to))
            .expect("known states");
    }

    pub fn target(&self, from: &str, event: &str) -> Option<&str> {
        self.table
            .get(&(Node::new(from), event.to_string()))
            .map(|n| n.name())
    }
}

pub struct TableContext {
    current: Node,
    output: Option<OutputSymbol>,
}

impl Device for TableDevice {
    type Configuration = Node;
    type Event = Sym;
    type Rule = Transition<Node>;
    type Context = TableContext;

    fn configurations(&self) -> Vec<Node> {
        self.nodes.iter().cloned().collect()
    }

    fn configuration(&self, name: &str) -> Option<Node> {
        self.nodes.get(&Node::new(name)).cloned()
    }

    fn initial(&self) -> Option<Node> {
        self.initial.clone()
    }

    fn accepting(&self) -> Vec<Node> {
        self.accepting.iter().cloned().collect()
    }

    fn is_accepting(&self, configuration: &Node) -> bool {
        self.accepting.contains(configuration)
    }

    fn events(&self) -> Option<Vec<Sym>> {
        None
    }

    fn rules(&self) -> Vec<Transition<Node>> {
        self.table
            .iter()
            .map(|((from, event), to)| Transition::new(from.clone(), event.clone(), to.clone()))
            .collect()
    }

    fn start(&self) -> EngineResult<TableContext> {
        let current = self
            .initial
            .clone()
            .ok_or_else(|| ExecutionError::new(ExecutionErrorKind::MissingInitialConfiguration))?;
        Ok(TableContext {
            current,
            output: None,
        })
    }

    fn create_configuration(&mut self) -> Node {
        let node = Node(format!("g{}", self.generated));
        self.generated += 1;
        self.nodes.insert(node.clone());
        node
    }

    fn add_configuration(&mut self, node: Node, initial: bool, accepting: bool) -> ResolutionResult<()> {
        if !self.nodes.insert(node.clone()) {
            return Err(ResolutionError::DuplicateConfiguration { name: node.0 });
        }
        if initial {
            self.initial = Some(node.clone());
        }
        if accepting {
            self.accepting.insert(node);
        }
        Ok(())
    }

    fn add_rule(&mut self, from: &Node, event: &str, to: &Node) -> ResolutionResult<Transition<Node>> {
        for node in [from, to] {
            if !self.nodes.contains(node) {
                return Err(ResolutionError::UnknownConfiguration { name: node.0.clone() });
            }
        }
        self.table
            .insert((from.clone(), event.to_string()), to.clone());
        Ok(Transition::new(from.clone(), event, to.clone()))
    }

    fn remove_rules(
        &mut self,
        from: Option<&Node>,
        event: Option<&str>,
        to: Option<&Node>,
    ) -> ResolutionResult<Vec<Transition<Node>>> {
        if from.is_none() && event.is_none() && to.is_none() {
            return Err(ResolutionError::RemoveEverything);
        }
        let removed: Vec<Transition<Node>> = self
            .rules()
            .into_iter()
            .filter(|rule| {
                use crate::rule::Rule;
                from.map_or(true, |f| rule.source() == f)
                    && event.map_or(true, |e| rule.event() == e)
                    && to.map_or(true, |t| rule.destination() == t)
            })
            .collect();
        for rule in &removed {
            use crate::rule::Rule;
            self.table
                .remove(&(rule.source().clone(), rule.event().to_string()));
        }
        Ok(removed)
    }

    fn rule_exists(&self, rule: &Transition<Node>) -> bool {
        use crate::rule::Rule;
        self.table
            .get(&(rule.source().clone(), rule.event().to_string()))
            == Some(rule.destination())
    }
}

impl ExecutionContext<TableDevice> for TableContext {
    fn current(&self) -> &Node {
        &self.current
    }

    fn change_configuration(&mut self, next: Node) -> EngineResult<()> {
        if self.output.is_some() {
            return Err(ExecutionError::new(ExecutionErrorKind::Terminated));
        }
        self.current = next;
        Ok(())
    }

    fn apply(
        &mut self,
        _device: &mut TableDevice,
        input: &mut dyn InputStream<Event = Sym>,
        rule: &Transition<Node>,
    ) -> EngineResult<Node> {
        if self.output.is_some() {
            return Err(ExecutionError::new(ExecutionErrorKind::Terminated));
        }
        apply_rule::<TableDevice, _>(rule, input, self)
    }

    fn rules_for(&self, device: &TableDevice, event: Option<&Sym>) -> Vec<Transition<Node>> {
        let key = event.map(|e| e.symbol().to_string()).unwrap_or_default();
        device
            .table
            .get(&(self.current.clone(), key.clone()))
            .map(|to| vec![Transition::new(self.current.clone(), key, to.clone())])
            .unwrap_or_default()
    }

    fn terminate(&mut self, device: &TableDevice, fully_consumed: bool) {
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

/// Adaptive wrapper around an empty table device with the given states.
pub fn adaptive(states: &[(&str, bool, bool)]) -> AdaptiveDevice<TableDevice> {
    let mut device = TableDevice::new();
    for (name, initial, accepting) in states {
        device.state(name, *initial, *accepting);
    }
    AdaptiveDevice::new(device)
}
