//! Entry point for test binaries built with `harness = false`.

use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use peridot_core::{Context, EventBus, Runner, trace_categories};
use peridot_reporter::{ReporterBase, ReporterFactory, SharedOutput, output};

use crate::args::CommandLineArgs;
use crate::config::Configuration;
use crate::error::Error;
use crate::events::TraceEventConfig;
use crate::productinfo;

/// Exit code of a run in which no spec failed.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit code of a run in which at least one spec failed.
pub const EXIT_FAILURES: u8 = 1;

/// Exit code when the harness itself could not complete the run.
pub const EXIT_HARNESS_ERROR: u8 = 2;

/// Declares, runs and reports the specs of one test binary.
///
/// ```no_run
/// fn main() -> std::process::ExitCode {
///     peridot::Harness::new().run(|context| {
///         context.describe("Vec", |suite| {
///             suite.it("starts empty", |_| {
///                 assert!(Vec::<u8>::new().is_empty());
///                 Ok(())
///             });
///         });
///     })
/// }
/// ```
#[derive(Debug, Default)]
pub struct Harness {
    factory: ReporterFactory,
}

impl Harness {
    /// Returns a harness with the built-in reporters registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes a custom reporter selectable with `--reporter <name>`.
    ///
    /// # Arguments
    ///
    /// * `name` - The name the reporter is selected by.
    /// * `description` - One-line summary shown by `--reporters`.
    /// * `init` - Subscribes the reporter's listeners on the base it is handed.
    #[must_use]
    pub fn register_reporter<F>(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        init: F,
    ) -> Self
    where
        F: Fn(&ReporterBase) -> Result<(), peridot_reporter::Error> + 'static,
    {
        self.factory.register(name, description, init);
        self
    }

    /// Returns the reporters available to this harness.
    pub const fn reporters(&self) -> &ReporterFactory {
        &self.factory
    }

    /// Parses the process's command line, runs the specs declared by `define` and
    /// reports to stdout.
    ///
    /// # Arguments
    ///
    /// * `define` - Declares the suites and specs to run.
    pub fn run<F>(&self, define: F) -> ExitCode
    where
        F: FnOnce(&mut Context),
    {
        let args = match CommandLineArgs::try_parse_from(std::env::args()) {
            Ok(args) => args,
            Err(e) => {
                let _ = e.print();

                // clap returns errors for `--help` and `--version` too.
                let exit_code = match e.kind() {
                    clap::error::ErrorKind::DisplayHelp
                    | clap::error::ErrorKind::DisplayVersion => EXIT_SUCCESS,
                    _ => EXIT_HARNESS_ERROR,
                };

                return ExitCode::from(exit_code);
            }
        };

        let _trace_config = TraceEventConfig::init(&args.enabled_log_events);

        match self.run_with(&args, output::stdout(), define) {
            Ok(code) => ExitCode::from(code),
            Err(err) => {
                tracing::error!("error: {err:#}");
                ExitCode::from(EXIT_HARNESS_ERROR)
            }
        }
    }

    /// Parses the given command line, then behaves like [`Harness::run_with`].
    ///
    /// # Arguments
    ///
    /// * `argv` - The command line, including the program name.
    /// * `output` - Where the reporter writes.
    /// * `define` - Declares the suites and specs to run.
    pub fn run_from<I, T, F>(&self, argv: I, output: SharedOutput, define: F) -> Result<u8, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
        F: FnOnce(&mut Context),
    {
        let args = CommandLineArgs::try_parse_from(argv)?;
        self.run_with(&args, output, define)
    }

    /// Runs the specs declared by `define` with already-parsed arguments. Returns the
    /// exit code for the run.
    ///
    /// # Arguments
    ///
    /// * `args` - The parsed command line.
    /// * `output` - Where the reporter writes.
    /// * `define` - Declares the suites and specs to run.
    pub fn run_with<F>(
        &self,
        args: &CommandLineArgs,
        output: SharedOutput,
        define: F,
    ) -> Result<u8, Error>
    where
        F: FnOnce(&mut Context),
    {
        if args.list_reporters {
            let mut output = output.borrow_mut();
            output.writeln("")?;
            for (name, description) in self.factory.reporters() {
                output.writeln(&format!("    {name} - {description}"))?;
            }
            output.writeln("")?;
            return Ok(EXIT_SUCCESS);
        }

        tracing::debug!(
            target: trace_categories::RUNNER,
            "{}",
            productinfo::get_product_display_str()
        );

        let configuration = Rc::new(Configuration::from_args(args));
        let event_bus = EventBus::new();
        let _reporter = self.factory.create(
            configuration.reporter(),
            configuration.clone(),
            output,
            event_bus.clone(),
        )?;

        let mut context = Context::new();
        define(&mut context);

        let runner = Runner::new(event_bus, configuration.runner_options().clone());
        let stats = runner.run(context.roots())?;

        Ok(if stats.has_failures() {
            EXIT_FAILURES
        } else {
            EXIT_SUCCESS
        })
    }
}
