//! Tracing setup for test binaries.

use std::collections::HashSet;
use std::fmt::Display;

use peridot_core::trace_categories;
use tracing_subscriber::{Layer, filter::Targets, layer::SubscriberExt, util::SubscriberInitExt};

/// Type of event to trace.
#[derive(Clone, Debug, Eq, Hash, PartialEq, clap::ValueEnum)]
pub enum TraceEvent {
    /// Traces event dispatch on the bus.
    #[clap(name = "events")]
    Events,
    /// Traces reporter registration and creation.
    #[clap(name = "reporter")]
    Reporter,
    /// Traces traversal of the spec tree.
    #[clap(name = "runner")]
    Runner,
    /// Traces construction of the spec tree.
    #[clap(name = "tree")]
    Tree,
}

impl Display for TraceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Events => write!(f, "events"),
            Self::Reporter => write!(f, "reporter"),
            Self::Runner => write!(f, "runner"),
            Self::Tree => write!(f, "tree"),
        }
    }
}

/// Tracing setup for a test binary.
#[derive(Debug, Default)]
pub struct TraceEventConfig {
    enabled_trace_events: HashSet<TraceEvent>,
    initialized: bool,
}

impl TraceEventConfig {
    /// Installs a subscriber writing to stderr: INFO by default, DEBUG for the given
    /// categories.
    pub fn init(enabled_log_events: &[TraceEvent]) -> Self {
        let mut config = Self {
            enabled_trace_events: enabled_log_events.iter().cloned().collect(),
            ..Default::default()
        };

        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .without_time()
            .with_filter(config.compose_filter());

        if tracing_subscriber::registry().with(layer).try_init().is_ok() {
            config.initialized = true;
        } else {
            // Something went wrong; proceed on anyway but complain audibly.
            eprintln!("warning: failed to initialize tracing.");
        }

        config
    }

    fn compose_filter(&self) -> Targets {
        let mut filter =
            Targets::new().with_default(tracing_subscriber::filter::LevelFilter::INFO);

        for event in &self.enabled_trace_events {
            let target = match event {
                TraceEvent::Events => trace_categories::EVENTS,
                TraceEvent::Reporter => trace_categories::REPORTER,
                TraceEvent::Runner => trace_categories::RUNNER,
                TraceEvent::Tree => trace_categories::TREE,
            };

            filter = filter.with_target(target, tracing::Level::DEBUG);
        }

        filter
    }

    /// Returns the categories logged at debug level.
    pub const fn get_enabled_events(&self) -> &HashSet<TraceEvent> {
        &self.enabled_trace_events
    }

    /// Returns whether the subscriber was installed.
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }
}
