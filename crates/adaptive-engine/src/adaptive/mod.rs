//! Self-modifying rules layered over a plain device.
//!
//! ```text
//! AdaptiveDevice<D>
//!   ├── D                    plain rule table (deterministic)
//!   └── AdaptiveMechanism<D>
//!         ├── functions      name -> AdaptiveFunction
//!         └── wrappers       rule -> AdaptiveRule<D> (pre/post calls)
//! ```
//!
//! Applying an [`AdaptiveRule`] runs its pre call, checks that the rule still
//! exists, applies the plain rule and runs its post call. Calls run
//! [`AdaptiveFunction`]s, which create fresh configurations and insert or
//! remove rules of the same device.

mod action;
mod device;
mod function;
mod mechanism;
mod parameter;
mod rule;

pub use action::{AdaptiveAction, CallTemplate, InsertAction, RemoveAction};
pub use device::{AdaptiveContext, AdaptiveDevice};
pub use function::{AdaptiveFunction, AdaptiveFunctionCall};
pub use mechanism::AdaptiveMechanism;
pub use parameter::{Argument, Parameter, ParameterKind, Resolver};
pub use rule::AdaptiveRule;
