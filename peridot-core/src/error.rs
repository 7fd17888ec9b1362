use crate::events::EventName;

/// Monolithic error type for the framework core.
///
/// Failing specs are not errors of the framework; they are carried as
/// [`ErrorRecord`](crate::ErrorRecord) values through the event bus.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A child was registered under a node that is not a suite.
    #[error("cannot register '{child}' under spec '{parent}': only suites may have children")]
    NotASuite {
        /// Title of the node that was asked to adopt a child.
        parent: String,
        /// Description of the rejected child.
        child: String,
    },

    /// A listener was re-entered while it was still handling an earlier event.
    #[error("listener for '{0}' re-entered during its own dispatch")]
    ReentrantListener(EventName),

    /// A listener reported a failure; delivery of the current event was halted.
    #[error("listener for '{event}' failed: {message}")]
    Listener {
        /// The event being dispatched.
        event: EventName,
        /// Description of the failure.
        message: String,
    },

    /// An I/O error occurred inside a listener.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred while formatting a string.
    #[error("{0}")]
    Formatting(#[from] std::fmt::Error),
}

/// Convenience function for failing a listener with a message.
///
/// # Arguments
///
/// * `event` - The event that was being handled.
/// * `message` - Description of the failure.
pub fn listener_failure<T>(event: EventName, message: impl Into<String>) -> Result<T, Error> {
    Err(Error::Listener {
        event,
        message: message.into(),
    })
}
