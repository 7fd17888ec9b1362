//! Peridot: a behavior-driven test framework.
//!
//! Suites and specs are declared with a [`Context`], run by a [`Runner`] and reported
//! through listeners on an [`EventBus`]. The [`Harness`] ties these together for test
//! binaries declared with `harness = false`.

pub mod args;
pub mod config;
mod entry;
mod error;
pub mod events;
pub mod productinfo;

pub use entry::{EXIT_FAILURES, EXIT_HARNESS_ERROR, EXIT_SUCCESS, Harness};
pub use error::Error;

pub use peridot_core::{
    Context, ErrorRecord, Event, EventBus, EventName, Pending, Runner, RunnerOptions, RunStats,
    Scope, SpecNode, SpecResult, SuiteBuilder,
};
pub use peridot_reporter::{
    AnonymousReporter, BufferedOutput, ColorKey, Output, Reporter, ReporterBase,
    ReporterConfiguration, ReporterFactory, SharedOutput, SpecReporter, StaticConfiguration,
    Symbol,
};
