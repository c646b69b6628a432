//! Input streams consumed by the executor.

use serde::{Deserialize, Serialize};

use crate::device::Event;

/// An ordered stream of input events.
///
/// The executor only peeks and consumes; the sub-sequence accessors exist for
/// diagnostics.
pub trait InputStream {
    /// Event type carried by the stream.
    type Event: Event;

    /// Check if an unconsumed event remains.
    fn has_next(&self) -> bool;

    /// Look at the next event without consuming it.
    fn peek(&self) -> Option<&Self::Event>;

    /// Consume and return the next event.
    fn consume(&mut self) -> Option<Self::Event>;

    /// The stream as originally given.
    fn original(&self) -> Vec<Self::Event>;

    /// Events consumed so far.
    fn consumed(&self) -> Vec<Self::Event>;

    /// Events not yet consumed.
    fn remaining(&self) -> Vec<Self::Event>;

    /// Separator used to render events back into text.
    fn separator(&self) -> &str;

    /// Capture the stream state for diagnostics.
    fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            original: symbols(self.original()),
            consumed: symbols(self.consumed()),
            separator: self.separator().to_string(),
        }
    }
}

fn symbols<E: Event>(events: Vec<E>) -> Vec<String> {
    events.iter().map(|e| e.symbol().to_string()).collect()
}

/// Textual copy of an input stream's state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Symbols of the original input.
    pub original: Vec<String>,
    /// Symbols consumed before the snapshot.
    pub consumed: Vec<String>,
    /// Separator between symbols.
    pub separator: String,
}

impl InputSnapshot {
    /// Render the original input.
    pub fn render_original(&self) -> String {
        self.render(&self.original)
    }

    /// Render the consumed prefix.
    pub fn render_consumed(&self) -> String {
        self.render(&self.consumed)
    }

    fn render(&self, symbols: &[String]) -> String {
        if symbols.is_empty() {
            "*empty*".to_string()
        } else {
            symbols.join(&self.separator)
        }
    }
}
