//! Text input split into symbols.

use adaptive_engine::{Event, InputStream};

use crate::state::Symbol;

/// Separator used by [`StringInput::new`].
pub const DEFAULT_SEPARATOR: &str = "&";

/// An input stream built by splitting a line of text.
///
/// An empty separator yields one symbol per character. Empty text yields no
/// symbols, and trailing empty pieces are dropped (`"a&b&"` is `a`, `b`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringInput {
    symbols: Vec<Symbol>,
    position: usize,
    separator: String,
}

impl StringInput {
    /// Split `text` on [`DEFAULT_SEPARATOR`].
    pub fn new(text: &str) -> Self {
        Self::with_separator(text, DEFAULT_SEPARATOR)
    }

    /// Split `text` on `separator`.
    pub fn with_separator(text: &str, separator: &str) -> Self {
        let mut symbols: Vec<Symbol> = if text.is_empty() {
            Vec::new()
        } else if separator.is_empty() {
            text.chars().map(|c| Symbol::new(c.to_string())).collect()
        } else {
            text.split(separator).map(Symbol::new).collect()
        };
        while symbols.last().is_some_and(|s| s.symbol().is_empty()) {
            symbols.pop();
        }
        Self {
            symbols,
            position: 0,
            separator: separator.to_string(),
        }
    }

    /// Add a symbol at the end of the stream, or right before the next
    /// unconsumed symbol.
    pub fn add_symbol(&mut self, symbol: Symbol, at_end: bool) {
        if at_end {
            self.symbols.push(symbol);
        } else {
            self.symbols.insert(self.position, symbol);
        }
    }

    /// Number of symbols, consumed or not.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check if the stream holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl InputStream for StringInput {
    type Event = Symbol;

    fn has_next(&self) -> bool {
        self.position < self.symbols.len()
    }

    fn peek(&self) -> Option<&Symbol> {
        self.symbols.get(self.position)
    }

    fn consume(&mut self) -> Option<Symbol> {
        let symbol = self.symbols.get(self.position).cloned()?;
        self.position += 1;
        Some(symbol)
    }

    fn original(&self) -> Vec<Symbol> {
        self.symbols.clone()
    }

    fn consumed(&self) -> Vec<Symbol> {
        self.symbols[..self.position].to_vec()
    }

    fn remaining(&self) -> Vec<Symbol> {
        self.symbols[self.position..].to_vec()
    }

    fn separator(&self) -> &str {
        &self.separator
    }
}
