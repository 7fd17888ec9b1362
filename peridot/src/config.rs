//! Run configuration resolved from the command line and the environment.

use std::io::IsTerminal;

use peridot_core::RunnerOptions;
use peridot_reporter::ReporterConfiguration;

use crate::args::CommandLineArgs;

/// Environment variable that disables colors when set, per <https://no-color.org>.
const NO_COLOR_VAR: &str = "NO_COLOR";

/// Settings for one run of a test binary.
#[derive(Clone, Debug)]
pub struct Configuration {
    colors_enabled: bool,
    reporter: String,
    runner_options: RunnerOptions,
}

impl Configuration {
    /// Resolves the configuration from parsed arguments, the terminal and the environment.
    pub fn from_args(args: &CommandLineArgs) -> Self {
        Self::resolve(
            args,
            std::io::stdout().is_terminal(),
            std::env::var_os(NO_COLOR_VAR).is_some(),
        )
    }

    fn resolve(args: &CommandLineArgs, stdout_is_terminal: bool, no_color_env: bool) -> Self {
        let colors_enabled =
            args.force_colors || (!args.no_colors && stdout_is_terminal && !no_color_env);

        Self {
            colors_enabled,
            reporter: args.reporter.clone(),
            runner_options: args.runner_options(),
        }
    }

    /// Returns the name of the selected reporter.
    pub fn reporter(&self) -> &str {
        &self.reporter
    }

    /// Returns the options to run the tree with.
    pub const fn runner_options(&self) -> &RunnerOptions {
        &self.runner_options
    }
}

impl ReporterConfiguration for Configuration {
    fn are_colors_enabled(&self) -> bool {
        self.colors_enabled
    }
}
