//! Depth-first traversal of the spec tree.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::Error;
use crate::events::{Event, EventBus};
use crate::node::SpecNode;
use crate::results::{ErrorRecord, SpecResult};
use crate::trace_categories;

/// Options controlling a run.
#[derive(Clone, Debug, Default)]
pub struct RunnerOptions {
    /// Stop running specs after the first failure.
    pub bail: bool,
    /// If non-empty, only specs whose title contains one of these run.
    pub include_filters: Vec<String>,
    /// Specs whose title contains one of these are left out.
    pub exclude_filters: Vec<String>,
}

impl RunnerOptions {
    /// Returns whether a spec with the given title should run under the filters.
    ///
    /// # Arguments
    ///
    /// * `title` - The full title of the spec.
    pub fn should_run(&self, title: &str) -> bool {
        // If any include filters were given, then we are in opt-in mode.
        if !self.include_filters.is_empty()
            && !self.include_filters.iter().any(|f| title.contains(f.as_str()))
        {
            return false;
        }

        !self.exclude_filters.iter().any(|f| title.contains(f.as_str()))
    }
}

/// Tallies of a completed run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunStats {
    /// Number of specs that passed.
    pub passed: usize,
    /// Number of specs that failed.
    pub failed: usize,
    /// Number of specs that were pending.
    pub pending: usize,
    /// Whether the run stopped early because of `bail`.
    pub halted: bool,
}

impl RunStats {
    /// Returns whether any spec failed.
    pub const fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Walks a spec tree, running hooks and bodies and emitting lifecycle events.
pub struct Runner {
    event_bus: EventBus,
    options: RunnerOptions,
    halted: Cell<bool>,
}

impl Runner {
    /// Creates a new runner that emits on the given bus.
    ///
    /// # Arguments
    ///
    /// * `event_bus` - The bus to emit lifecycle events on.
    /// * `options` - Options controlling the run.
    pub const fn new(event_bus: EventBus, options: RunnerOptions) -> Self {
        Self {
            event_bus,
            options,
            halted: Cell::new(false),
        }
    }

    /// Returns the bus this runner emits on.
    pub const fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Runs every tree rooted at the given nodes, in order.
    ///
    /// # Arguments
    ///
    /// * `roots` - The top-level nodes to run.
    pub fn run(&self, roots: &[Rc<SpecNode>]) -> Result<RunStats, Error> {
        self.halted.set(false);
        let mut stats = RunStats::default();

        tracing::debug!(
            target: trace_categories::RUNNER,
            "starting run of {} root(s)",
            roots.len()
        );
        self.event_bus.emit(&Event::RunnerStart)?;

        for root in roots {
            if self.halted.get() {
                break;
            }
            self.run_node(root, false, &mut stats)?;
        }

        stats.halted = self.halted.get();
        self.event_bus.emit(&Event::RunnerEnd)?;
        tracing::debug!(target: trace_categories::RUNNER, "finished run: {stats:?}");

        Ok(stats)
    }

    fn run_node(
        &self,
        node: &Rc<SpecNode>,
        inherited_pending: bool,
        stats: &mut RunStats,
    ) -> Result<(), Error> {
        if node.event_emitter().is_none() {
            node.set_event_emitter(self.event_bus.clone());
        }

        let pending = node.resolve_pending(inherited_pending);

        if node.is_suite() {
            self.event_bus.emit(&Event::SuiteStart(node.clone()))?;
            for child in node.children() {
                if self.halted.get() {
                    break;
                }
                self.run_node(&child, pending, stats)?;
            }
            self.event_bus.emit(&Event::SuiteEnd(node.clone()))?;
            return Ok(());
        }

        let title = node.title();
        if !self.options.should_run(&title) {
            tracing::debug!(target: trace_categories::RUNNER, "filtered out '{title}'");
            return Ok(());
        }

        if pending {
            tracing::debug!(target: trace_categories::RUNNER, "pending '{title}'");
            stats.pending += 1;
            return self.event_bus.emit(&Event::SpecPending(node.clone()));
        }

        self.event_bus.emit(&Event::SpecStart(node.clone()))?;

        match execute_spec(node) {
            Ok(()) => {
                tracing::debug!(target: trace_categories::RUNNER, "passed '{title}'");
                stats.passed += 1;
                self.event_bus.emit(&Event::SpecPassed(node.clone()))
            }
            Err(record) => {
                tracing::debug!(
                    target: trace_categories::RUNNER,
                    "failed '{title}': {}",
                    record.message()
                );
                stats.failed += 1;
                if self.options.bail {
                    self.halted.set(true);
                }
                self.event_bus
                    .emit(&Event::SpecFailed(node.clone(), Rc::new(record)))
            }
        }
    }
}

/// Runs the setUp hooks of the chain root to leaf, then the body, then the tearDown
/// hooks leaf to root. The first failure wins; tearDown hooks always run.
fn execute_spec(spec: &Rc<SpecNode>) -> SpecResult {
    let chain = spec.ancestors();

    let mut outcome = run_set_up(&chain);
    if outcome.is_ok() {
        outcome = match spec.definition() {
            Some(body) => body.invoke(),
            None => Err(ErrorRecord::new(format!(
                "'{}' has no body to run",
                spec.title()
            ))),
        };
    }

    for node in chain.iter().rev() {
        for hook in node.tear_down_functions() {
            let result = hook.invoke();
            if outcome.is_ok() {
                outcome = result;
            }
        }
    }

    outcome
}

fn run_set_up(chain: &[Rc<SpecNode>]) -> SpecResult {
    for node in chain {
        for hook in node.set_up_functions() {
            hook.invoke()?;
        }
    }
    Ok(())
}
