//! The default reporter: an indented outline of suites and specs.

use std::rc::Rc;

use peridot_core::{Event, EventName, SpecNode, trace_categories};

use crate::error::Error;
use crate::palette::{ColorKey, Symbol};
use crate::reporter::{Reporter, ReporterBase};

/// Renders a nested outline of the run, one line per suite and spec, followed by the
/// footer.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpecReporter;

impl SpecReporter {
    /// Returns a new spec reporter.
    pub const fn new() -> Self {
        Self
    }
}

impl Reporter for SpecReporter {
    fn init(&self, base: &ReporterBase) -> Result<(), Error> {
        let bus = base.event_bus();

        let b = base.clone();
        bus.on(EventName::RunnerStart, move |_| {
            b.output().borrow_mut().writeln("")?;
            Ok(())
        });

        let b = base.clone();
        bus.on(EventName::SuiteStart, move |event| {
            let Some(suite) = event.node() else {
                return Ok(());
            };

            if suite.description().is_empty() {
                return Ok(());
            }

            let line = format!(
                "{}{}",
                indent(suite),
                b.color(ColorKey::White, suite.description())
            );
            b.output().borrow_mut().writeln(&line)?;
            Ok(())
        });

        let b = base.clone();
        bus.on(EventName::SpecPassed, move |event| {
            let Some(spec) = event.node() else {
                return Ok(());
            };

            let line = format!(
                "{}{} {}",
                indent(spec),
                b.color(ColorKey::Success, b.symbol(Symbol::Check)),
                b.color(ColorKey::Muted, spec.description())
            );
            b.output().borrow_mut().writeln(&line)?;
            Ok(())
        });

        let b = base.clone();
        bus.on(EventName::SpecFailed, move |event| {
            let Event::SpecFailed(spec, _) = event else {
                return Ok(());
            };

            let count = b.failures().len();
            let line = format!(
                "{}{}",
                indent(spec),
                b.color(ColorKey::Error, &format!("{count}) {}", spec.description()))
            );
            b.output().borrow_mut().writeln(&line)?;
            Ok(())
        });

        let b = base.clone();
        bus.on(EventName::SpecPending, move |event| {
            let Some(spec) = event.node() else {
                return Ok(());
            };

            let line = format!(
                "{}{}",
                indent(spec),
                b.color(ColorKey::Pending, &format!("- {}", spec.description()))
            );
            b.output().borrow_mut().writeln(&line)?;
            Ok(())
        });

        let b = base.clone();
        bus.on(EventName::RunnerEnd, move |_| {
            b.footer()?;
            Ok(())
        });

        tracing::debug!(target: trace_categories::REPORTER, "spec reporter subscribed");
        Ok(())
    }
}

fn indent(node: &Rc<SpecNode>) -> String {
    "  ".repeat(node.depth() + 1)
}
