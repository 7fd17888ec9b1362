//! Core of the Peridot behavior-driven test framework: the spec tree, the per-node
//! execution scopes, the event bus that decouples traversal from reporting, and a runner
//! that walks the tree.

mod dsl;
mod error;
pub mod events;
mod node;
mod results;
mod runner;
mod scope;
pub mod trace_categories;

pub use dsl::{Context, SuiteBuilder};
pub use error::{Error, listener_failure};
pub use events::{Event, EventBus, EventName, ListenerResult};
pub use node::{BoundHook, HookFn, NodeKind, Pending, SpecNode};
pub use results::{ErrorRecord, FRAME_MARKER, SpecResult};
pub use runner::{RunStats, Runner, RunnerOptions};
pub use scope::Scope;
