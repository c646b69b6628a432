//! Finite-automaton substrate for `adaptive-engine`.
//!
//! - [`Automaton`]: deterministic automaton with string-named states and a
//!   mutable rule table, implementing the engine's `Device` contract
//! - [`StringInput`]: a line of text split into symbols
//! - [`DeviceDescription`]: JSON descriptions of adaptive automata
//! - [`samples`]: the `a*b+` and `aⁿbⁿcⁿ` worked examples
//!
//! ```
//! use adaptive_automaton::{samples, StringInput};
//! use adaptive_engine::{run, OutputSymbol};
//!
//! let mut device = samples::anbncn().unwrap();
//! let output = run(&mut device, &mut StringInput::with_separator("aabbcc", "")).unwrap();
//! assert_eq!(output, OutputSymbol::Accept);
//! ```

mod automaton;
pub mod description;
mod input;
pub mod samples;
mod state;

pub use automaton::{Automaton, AutomatonContext, AutomatonRule, GENERATED_PREFIX};
pub use description::{DescriptionError, DescriptionResult, DeviceDescription};
pub use input::{StringInput, DEFAULT_SEPARATOR};
pub use state::{State, Symbol};
