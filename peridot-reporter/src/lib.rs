//! Reporters for the Peridot test framework.
//!
//! A reporter is layered on a [`ReporterBase`], which subscribes to the run's event bus,
//! aggregates pass/fail/pending counts and renders the summary footer. Concrete reporters
//! add their own listeners in [`Reporter::init`].

mod anonymous;
mod config;
mod error;
mod factory;
pub mod output;
mod palette;
mod reporter;
mod spec_reporter;

pub use anonymous::{AnonymousReporter, ReporterInit};
pub use config::{ReporterConfiguration, StaticConfiguration};
pub use error::Error;
pub use factory::{DEFAULT_REPORTER, ReporterFactory};
pub use output::{BufferedOutput, Output, SharedOutput, WriterOutput};
pub use palette::{ColorKey, Symbol};
pub use reporter::{Failure, Reporter, ReporterBase, format_elapsed};
pub use spec_reporter::SpecReporter;
