/// Errors that abort a test run, as opposed to failing specs.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An error from the framework core, such as a failing event listener.
    #[error(transparent)]
    Core(#[from] peridot_core::Error),

    /// An error creating or driving a reporter.
    #[error(transparent)]
    Reporter(#[from] peridot_reporter::Error),

    /// The command line could not be parsed.
    #[error("invalid arguments: {0}")]
    Args(#[from] clap::Error),

    /// An I/O error occurred.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
