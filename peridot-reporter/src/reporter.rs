//! The base every reporter is built on.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::time::{Duration, Instant};

use itertools::Itertools;
use peridot_core::{
    ErrorRecord, Event, EventBus, EventName, FRAME_MARKER, SpecNode, trace_categories,
};

use crate::config::ReporterConfiguration;
use crate::error::Error;
use crate::output::SharedOutput;
use crate::palette::{ColorKey, Symbol};

/// Indentation inserted before every frame of a failure's trace.
const TRACE_INDENT: &str = "      ";

/// A concrete reporter: decides what to render as events arrive.
pub trait Reporter {
    /// Registers the reporter's own listeners. Called once, after the base has
    /// subscribed its bookkeeping listeners.
    ///
    /// # Arguments
    ///
    /// * `base` - The base this reporter is layered on; clone it into listeners.
    fn init(&self, base: &ReporterBase) -> Result<(), Error>;
}

/// A failing spec together with the record describing its failure.
///
/// The spec's title is captured when the failure is recorded, so it stays complete even
/// after the tree the spec belonged to has been dropped.
#[derive(Clone, Debug)]
pub struct Failure {
    title: String,
    spec: Rc<SpecNode>,
    error: Rc<ErrorRecord>,
}

impl Failure {
    fn new(spec: &Rc<SpecNode>, error: &Rc<ErrorRecord>) -> Self {
        Self {
            title: spec.title(),
            spec: spec.clone(),
            error: error.clone(),
        }
    }

    /// Returns the full title of the failing spec, as of the failure.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the failing spec.
    pub const fn spec(&self) -> &Rc<SpecNode> {
        &self.spec
    }

    /// Returns the record describing the failure.
    pub const fn error(&self) -> &Rc<ErrorRecord> {
        &self.error
    }
}

/// Aggregates accumulated by the base over a run.
#[derive(Debug, Default)]
struct ReporterState {
    errors: Vec<Failure>,
    passing: usize,
    pending: usize,
    started: Option<Instant>,
    elapsed: Option<Duration>,
}

impl ReporterState {
    fn elapsed(&self) -> Duration {
        self.elapsed
            .or_else(|| self.started.map(|started| started.elapsed()))
            .unwrap_or_default()
    }
}

/// Shared bookkeeping and rendering helpers for reporters.
///
/// Cloning yields another handle to the same state, output and bus.
#[derive(Clone)]
pub struct ReporterBase {
    configuration: Rc<dyn ReporterConfiguration>,
    output: SharedOutput,
    event_bus: EventBus,
    state: Rc<RefCell<ReporterState>>,
}

impl ReporterBase {
    /// Creates the base, subscribes it to the run's lifecycle events and then lets the
    /// given reporter register its own listeners.
    ///
    /// # Arguments
    ///
    /// * `configuration` - Supplies the color setting.
    /// * `output` - Where rendered text goes.
    /// * `event_bus` - The bus the run emits on.
    /// * `reporter` - The concrete reporter to initialize.
    pub fn new<R: Reporter + ?Sized>(
        configuration: Rc<dyn ReporterConfiguration>,
        output: SharedOutput,
        event_bus: EventBus,
        reporter: &R,
    ) -> Result<Self, Error> {
        let base = Self {
            configuration,
            output,
            event_bus,
            state: Rc::new(RefCell::new(ReporterState::default())),
        };

        base.subscribe();
        reporter.init(&base)?;

        tracing::debug!(target: trace_categories::REPORTER, "reporter initialized");
        Ok(base)
    }

    fn subscribe(&self) {
        let state = self.state.clone();
        self.event_bus.on(EventName::RunnerStart, move |_| {
            state.borrow_mut().started = Some(Instant::now());
            Ok(())
        });

        let state = self.state.clone();
        self.event_bus.on(EventName::RunnerEnd, move |_| {
            let mut state = state.borrow_mut();
            state.elapsed = Some(state.started.map(|s| s.elapsed()).unwrap_or_default());
            Ok(())
        });

        let state = self.state.clone();
        self.event_bus.on(EventName::SpecFailed, move |event| {
            if let Event::SpecFailed(spec, error) = event {
                state.borrow_mut().errors.push(Failure::new(spec, error));
            }
            Ok(())
        });

        let state = self.state.clone();
        self.event_bus.on(EventName::SpecPassed, move |_| {
            state.borrow_mut().passing += 1;
            Ok(())
        });

        let state = self.state.clone();
        self.event_bus.on(EventName::SpecPending, move |_| {
            state.borrow_mut().pending += 1;
            Ok(())
        });
    }

    /// Colorizes text with the given palette key, unless colors are disabled.
    pub fn color(&self, key: ColorKey, text: &str) -> String {
        if !self.configuration.are_colors_enabled() {
            return text.to_owned();
        }

        key.wrap(text)
    }

    /// Colorizes text with the palette key of the given name.
    pub fn color_named(&self, key: &str, text: &str) -> Result<String, Error> {
        let key = ColorKey::from_str(key).map_err(|_| Error::UnknownColor(key.to_owned()))?;
        Ok(self.color(key, text))
    }

    /// Returns the glyph for the given symbol.
    pub const fn symbol(&self, symbol: Symbol) -> &'static str {
        symbol.glyph()
    }

    /// Returns the glyph for the symbol of the given name.
    pub fn symbol_named(&self, name: &str) -> Result<&'static str, Error> {
        let symbol = Symbol::from_str(name).map_err(|_| Error::UnknownSymbol(name.to_owned()))?;
        Ok(self.symbol(symbol))
    }

    /// Returns the output this reporter writes to.
    pub const fn output(&self) -> &SharedOutput {
        &self.output
    }

    /// Returns the configuration this reporter consults.
    pub fn configuration(&self) -> &dyn ReporterConfiguration {
        self.configuration.as_ref()
    }

    /// Returns the bus this reporter listens on.
    pub const fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns the number of passing specs seen so far.
    pub fn passing(&self) -> usize {
        self.state.borrow().passing
    }

    /// Returns the number of pending specs seen so far.
    pub fn pending(&self) -> usize {
        self.state.borrow().pending
    }

    /// Returns the failures seen so far, in the order they were reported.
    pub fn failures(&self) -> Vec<Failure> {
        self.state.borrow().errors.clone()
    }

    /// Returns the duration of the run: final once the run ended, running before that.
    pub fn elapsed(&self) -> Duration {
        self.state.borrow().elapsed()
    }

    /// Writes the summary of the run: counts, then every failure with its trace.
    pub fn footer(&self) -> std::io::Result<()> {
        let state = self.state.borrow();
        let mut output = self.output.borrow_mut();

        output.writeln("")?;
        output.write(&self.color(ColorKey::Success, &format!("  {} passing", state.passing)))?;
        output.writeln(&self.color(
            ColorKey::Muted,
            &format!(" ({})", format_elapsed(&state.elapsed())),
        ))?;

        if !state.errors.is_empty() {
            output.writeln(
                &self.color(ColorKey::Error, &format!("  {} failing", state.errors.len())),
            )?;
        }

        if state.pending > 0 {
            output.writeln(
                &self.color(ColorKey::Pending, &format!("  {} pending", state.pending)),
            )?;
        }

        output.writeln("")?;

        for (i, failure) in state.errors.iter().enumerate() {
            let error = failure.error();
            output.writeln(&format!("  {}) {}:", i + 1, failure.title()))?;
            output.writeln(&self.color(ColorKey::Error, &format!("     {}", error.message())))?;
            output.writeln(&self.color(ColorKey::Muted, &indent_trace(&error.trace_as_string())))?;
        }

        Ok(())
    }
}

impl fmt::Debug for ReporterBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReporterBase")
            .field("state", &self.state.borrow())
            .field("event_bus", &self.event_bus)
            .finish_non_exhaustive()
    }
}

/// Inserts indentation before every line that starts with a frame marker.
fn indent_trace(trace: &str) -> String {
    trace
        .lines()
        .map(|line| {
            if line.starts_with(FRAME_MARKER) {
                format!("{TRACE_INDENT}{line}")
            } else {
                line.to_owned()
            }
        })
        .join("\n")
}

/// Formats a run duration for display.
///
/// # Arguments
///
/// * `duration` - The duration to format.
pub fn format_elapsed(duration: &Duration) -> String {
    if duration.as_secs() == 0 {
        format!("{} ms", duration.as_millis())
    } else {
        format!("{:.2} seconds", duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::config::StaticConfiguration;
    use crate::output::BufferedOutput;
    use peridot_core::{Runner, RunnerOptions};
    use pretty_assertions::{assert_eq, assert_matches};
    use strum::IntoEnumIterator;

    struct Quiet;

    impl Reporter for Quiet {
        fn init(&self, _base: &ReporterBase) -> Result<(), Error> {
            Ok(())
        }
    }

    struct Fixture {
        bus: EventBus,
        buffer: Rc<RefCell<BufferedOutput>>,
        base: ReporterBase,
    }

    fn fixture(colors_enabled: bool) -> Fixture {
        let bus = EventBus::new();
        let buffer = Rc::new(RefCell::new(BufferedOutput::new()));
        let base = ReporterBase::new(
            Rc::new(StaticConfiguration::new(colors_enabled)),
            buffer.clone(),
            bus.clone(),
            &Quiet,
        )
        .unwrap();

        Fixture { bus, buffer, base }
    }

    fn spec(description: &str) -> Rc<SpecNode> {
        SpecNode::spec(description, |_| Ok(()))
    }

    fn emit_counts(bus: &EventBus, passed: usize, failed: usize, pending: usize) {
        bus.emit(&Event::RunnerStart).unwrap();
        for i in 0..passed {
            bus.emit(&Event::SpecPassed(spec(&format!("pass {i}")))).unwrap();
        }
        for i in 0..failed {
            let record = Rc::new(ErrorRecord::new(format!("failure {i}")));
            bus.emit(&Event::SpecFailed(spec(&format!("fail {i}")), record))
                .unwrap();
        }
        for i in 0..pending {
            bus.emit(&Event::SpecPending(spec(&format!("pending {i}")))).unwrap();
        }
        bus.emit(&Event::RunnerEnd).unwrap();
    }

    #[test]
    fn test_init_runs_after_base_subscriptions() {
        struct ListenerCounter(Rc<Cell<usize>>);

        impl Reporter for ListenerCounter {
            fn init(&self, base: &ReporterBase) -> Result<(), Error> {
                self.0.set(base.event_bus().listener_count(EventName::SpecPassed));
                Ok(())
            }
        }

        let seen = Rc::new(Cell::new(0));
        let buffer = Rc::new(RefCell::new(BufferedOutput::new()));
        ReporterBase::new(
            Rc::new(StaticConfiguration::default()),
            buffer,
            EventBus::new(),
            &ListenerCounter(seen.clone()),
        )
        .unwrap();

        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn test_counts_accumulate() {
        let f = fixture(false);
        emit_counts(&f.bus, 3, 2, 1);

        assert_eq!(f.base.passing(), 3);
        assert_eq!(f.base.pending(), 1);

        let failures = f.base.failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].spec().description(), "fail 0");
        assert_eq!(failures[0].title(), "fail 0");
        assert_eq!(failures[1].error().message(), "failure 1");
    }

    #[test]
    fn test_color_disabled_returns_text_unchanged() {
        let f = fixture(false);
        for key in ColorKey::iter() {
            assert_eq!(f.base.color(key, "text"), "text");
        }
    }

    #[test]
    fn test_color_enabled_wraps_text() {
        let f = fixture(true);
        for key in ColorKey::iter() {
            assert_eq!(
                f.base.color(key, "text"),
                format!("{}text{}", key.left(), key.right())
            );
        }
    }

    #[test]
    fn test_named_lookups() {
        let f = fixture(true);
        assert_eq!(f.base.color_named("success", "ok").unwrap(), ColorKey::Success.wrap("ok"));
        assert_matches!(f.base.color_named("purple", "x"), Err(Error::UnknownColor(_)));
        assert_eq!(f.base.symbol_named("check").unwrap(), "✓");
        assert_matches!(f.base.symbol_named("cross"), Err(Error::UnknownSymbol(_)));
    }

    #[test]
    fn test_footer_only_passing() {
        let f = fixture(false);
        emit_counts(&f.bus, 4, 0, 0);
        f.base.footer().unwrap();

        let output = f.buffer.borrow().contents().to_owned();
        assert!(output.contains("  4 passing ("));
        assert!(!output.contains("failing"));
        assert!(!output.contains("pending"));
    }

    #[test]
    fn test_footer_counts_lines() {
        let f = fixture(false);
        emit_counts(&f.bus, 0, 2, 3);
        f.base.footer().unwrap();

        let output = f.buffer.borrow().contents().to_owned();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "");
        assert!(lines[1].starts_with("  0 passing ("));
        assert_eq!(lines[2], "  2 failing");
        assert_eq!(lines[3], "  3 pending");
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "  1) fail 0:");
        assert_eq!(lines[6], "     failure 0");
    }

    #[test]
    fn test_footer_scenario() {
        let bus = EventBus::new();
        let buffer = Rc::new(RefCell::new(BufferedOutput::new()));
        let base = ReporterBase::new(
            Rc::new(StaticConfiguration::new(false)),
            buffer.clone(),
            bus.clone(),
            &Quiet,
        )
        .unwrap();

        let mut context = peridot_core::Context::new();
        context.describe("Calculator", |suite| {
            suite.it("adds", |_| Ok(()));
            suite.it("subtracts", |_| Ok(()));
            suite.it("compares", |_| {
                Err(ErrorRecord::new("expected true, got false").with_frame("calculator.rs:42"))
            });
        });

        Runner::new(bus, RunnerOptions::default())
            .run(context.roots())
            .unwrap();
        base.footer().unwrap();

        let output = buffer.borrow().contents().to_owned();
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[1].starts_with("  2 passing ("));
        assert!(lines[1].ends_with(')'));
        assert_eq!(lines[2], "  1 failing");
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "  1) Calculator compares:");
        assert_eq!(lines[5], "     expected true, got false");
        assert_eq!(lines[6], "      #0 calculator.rs:42");
    }

    #[test]
    fn test_footer_keeps_titles_after_tree_is_dropped() {
        let bus = EventBus::new();
        let buffer = Rc::new(RefCell::new(BufferedOutput::new()));
        let base = ReporterBase::new(
            Rc::new(StaticConfiguration::new(false)),
            buffer.clone(),
            bus.clone(),
            &Quiet,
        )
        .unwrap();

        {
            let mut context = peridot_core::Context::new();
            context.describe("Calculator", |suite| {
                suite.describe("when comparing", |suite| {
                    suite.it("compares", |_| Err(ErrorRecord::new("mismatch")));
                });
            });

            Runner::new(bus, RunnerOptions::default())
                .run(context.roots())
                .unwrap();
        }

        base.footer().unwrap();

        let failures = base.failures();
        assert_eq!(failures[0].title(), "Calculator when comparing compares");
        assert_eq!(failures[0].spec().description(), "compares");

        let output = buffer.borrow().contents().to_owned();
        assert!(output.contains("  1) Calculator when comparing compares:\n"));
    }

    #[test]
    fn test_footer_colors() {
        let f = fixture(true);
        emit_counts(&f.bus, 1, 1, 1);
        f.base.footer().unwrap();

        let output = f.buffer.borrow().contents().to_owned();
        assert!(output.contains(&ColorKey::Success.wrap("  1 passing")));
        assert!(output.contains(&ColorKey::Error.wrap("  1 failing")));
        assert!(output.contains(&ColorKey::Pending.wrap("  1 pending")));
        assert!(output.contains(&ColorKey::Error.wrap("     failure 0")));

        let elapsed_start = format!("{}{} (", ColorKey::Success.right(), ColorKey::Muted.left());
        assert!(output.contains(&elapsed_start));
        assert!(output.contains(&format!("){}\n", ColorKey::Muted.right())));

        let plain = strip_ansi_escapes::strip_str(&output);
        assert!(plain.contains("  1 passing ("));
    }

    #[test]
    fn test_indent_trace() {
        assert_eq!(
            indent_trace("#0 a.rs:1\ncontinued\n#1 {main}"),
            "      #0 a.rs:1\ncontinued\n      #1 {main}"
        );
        assert_eq!(indent_trace(""), "");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(&Duration::from_millis(12)), "12 ms");
        assert_eq!(format_elapsed(&Duration::from_millis(1520)), "1.52 seconds");
    }

    #[test]
    fn test_elapsed_is_captured_at_runner_end() {
        let f = fixture(false);
        assert_eq!(f.base.elapsed(), Duration::ZERO);

        emit_counts(&f.bus, 0, 0, 0);
        let first = f.base.elapsed();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(f.base.elapsed(), first);
    }
}
