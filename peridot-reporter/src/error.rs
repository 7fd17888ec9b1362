/// Error type for reporters.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No reporter is registered under the given name.
    #[error("unknown reporter: {0}")]
    UnknownReporter(String),

    /// No color is registered under the given key.
    #[error("unknown color: {0}")]
    UnknownColor(String),

    /// No symbol is registered under the given name.
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    /// An error surfaced from the framework core, typically from event dispatch.
    #[error(transparent)]
    Core(#[from] peridot_core::Error),

    /// An I/O error occurred while writing output.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
