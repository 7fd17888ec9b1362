//! Command-line arguments accepted by Peridot test binaries.

use clap::{Parser, builder::styling};
use peridot_core::RunnerOptions;
use peridot_reporter::DEFAULT_REPORTER;

use crate::{events, productinfo};

const SHORT_DESCRIPTION: &str = "Behavior-driven test runner";

const LONG_DESCRIPTION: &str = r"
Runs the suites and specs declared by this test binary and reports their outcomes.

Positional arguments select specs whose full title contains any of them; --skip removes specs
whose title contains the given pattern.
";

/// Parsed command-line arguments for a Peridot test binary.
#[derive(Clone, Debug, Parser)]
#[clap(name = productinfo::PRODUCT_NAME,
       version = productinfo::PRODUCT_VERSION,
       about = SHORT_DESCRIPTION,
       long_about = LONG_DESCRIPTION,
       disable_help_flag = true,
       styles = help_styles())]
#[allow(clippy::struct_excessive_bools)]
pub struct CommandLineArgs {
    /// Display usage information.
    #[clap(long = "help", action = clap::ArgAction::HelpLong)]
    pub help: Option<bool>,

    /// Name of the reporter to use.
    #[clap(
        short = 'r',
        long = "reporter",
        env = "PERIDOT_REPORTER",
        default_value = DEFAULT_REPORTER
    )]
    pub reporter: String,

    /// List available reporters and exit.
    #[clap(long = "reporters")]
    pub list_reporters: bool,

    /// Stop running specs after the first failure.
    #[clap(short = 'b', long = "bail")]
    pub bail: bool,

    /// Disable colorized output.
    #[clap(short = 'C', long = "no-colors", conflicts_with = "force_colors")]
    pub no_colors: bool,

    /// Colorize output even when stdout is not a terminal.
    #[clap(long = "force-colors")]
    pub force_colors: bool,

    /// Enable debug logging for classes of tracing events.
    #[clap(long = "log-enable", value_name = "EVENT")]
    pub enabled_log_events: Vec<events::TraceEvent>,

    /// Show output from specs (for compatibility only, has no effect).
    #[clap(long = "show-output")]
    pub show_output: bool,

    /// Capture output? (for compatibility only, has no effect).
    #[clap(long = "nocapture")]
    pub no_capture: bool,

    /// Unstable flags (for compatibility only, has no effect).
    #[clap(short = 'Z')]
    pub unstable_flag: Vec<String>,

    /// Patterns for specs to be excluded.
    #[clap(long = "skip", value_name = "PATTERN")]
    pub exclude_filters: Vec<String>,

    /// Patterns for specs to be included.
    pub include_filters: Vec<String>,
}

impl CommandLineArgs {
    /// Returns the runner options selected by these arguments.
    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            bail: self.bail,
            include_filters: self.include_filters.clone(),
            exclude_filters: self.exclude_filters.clone(),
        }
    }
}

/// Returns clap styling to be used for command-line help.
#[doc(hidden)]
fn help_styles() -> clap::builder::Styles {
    styling::Styles::styled()
        .header(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .literal(styling::AnsiColor::Cyan.on_default() | styling::Effects::BOLD)
        .placeholder(styling::AnsiColor::Cyan.on_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::{assert_eq, assert_matches};

    fn parse(args: &[&str]) -> Result<CommandLineArgs, clap::Error> {
        CommandLineArgs::try_parse_from(std::iter::once("specs").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() -> anyhow::Result<()> {
        let args = parse(&[])?;

        assert!(!args.bail);
        assert!(!args.no_colors);
        assert!(!args.list_reporters);
        assert!(args.include_filters.is_empty());
        assert!(args.exclude_filters.is_empty());

        Ok(())
    }

    #[test]
    fn test_filters_and_flags() -> anyhow::Result<()> {
        let args = parse(&[
            "-b",
            "--skip",
            "slow",
            "Calculator",
            "--log-enable",
            "runner",
            "adds",
            "-r",
            "basic",
        ])?;

        assert!(args.bail);
        assert_eq!(args.reporter, "basic");
        assert_eq!(args.include_filters, vec!["Calculator", "adds"]);
        assert_eq!(args.exclude_filters, vec!["slow"]);
        assert_eq!(args.enabled_log_events, vec![events::TraceEvent::Runner]);

        let options = args.runner_options();
        assert!(options.bail);
        assert_eq!(options.include_filters, args.include_filters);

        Ok(())
    }

    #[test]
    fn test_compat_flags_are_accepted() -> anyhow::Result<()> {
        let args = parse(&["--nocapture", "--show-output", "-Z", "unstable-options"])?;
        assert!(args.no_capture);
        assert_eq!(args.unstable_flag, vec!["unstable-options"]);
        Ok(())
    }

    #[test]
    fn test_color_flags_conflict() {
        assert_matches!(
            parse(&["--no-colors", "--force-colors"]).map_err(|e| e.kind()),
            Err(clap::error::ErrorKind::ArgumentConflict)
        );
    }

    #[test]
    fn test_unknown_log_event() {
        assert!(parse(&["--log-enable", "everything"]).is_err());
    }
}
