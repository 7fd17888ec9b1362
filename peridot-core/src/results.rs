//! Outcome values produced by hooks and spec bodies.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt::{self, Display};
use std::panic::AssertUnwindSafe;
use std::sync::Once;

use itertools::Itertools;

/// Character that begins every line of a rendered trace.
pub const FRAME_MARKER: char = '#';

/// Result of running a hook or a spec body.
pub type SpecResult = Result<(), ErrorRecord>;

/// Describes why a spec failed: a human-readable message and the frames leading to it.
///
/// Conversions exist from any [`std::error::Error`], so bodies can use `?` freely; the
/// error's `source()` chain becomes the trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorRecord {
    message: String,
    frames: Vec<String>,
}

impl ErrorRecord {
    /// Returns a new record with the given message and no frames.
    ///
    /// # Arguments
    ///
    /// * `message` - Human-readable description of the failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            frames: vec![],
        }
    }

    /// Appends a frame to the record's trace.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.frames.push(frame.into());
        self
    }

    /// Returns the failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the trace frames, innermost first.
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    /// Renders the trace, one `#<index> <frame>` line per frame.
    pub fn trace_as_string(&self) -> String {
        self.frames
            .iter()
            .enumerate()
            .map(|(i, frame)| format!("{FRAME_MARKER}{i} {frame}"))
            .join("\n")
    }

    /// Builds a record from a caught panic payload.
    ///
    /// # Arguments
    ///
    /// * `payload` - The payload returned by [`std::panic::catch_unwind`].
    /// * `location` - Where the panic was raised, if known.
    pub fn from_panic(payload: &(dyn Any + Send), location: Option<String>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            String::from("spec panicked")
        };

        Self {
            message,
            frames: location.into_iter().collect(),
        }
    }
}

impl Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl<E: std::error::Error> From<E> for ErrorRecord {
    fn from(error: E) -> Self {
        let mut frames = vec![];
        let mut source = error.source();
        while let Some(cause) = source {
            frames.push(cause.to_string());
            source = cause.source();
        }

        Self {
            message: error.to_string(),
            frames,
        }
    }
}

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static PANIC_LOCATION: RefCell<Option<String>> = const { RefCell::new(None) };
}

static INSTALL_PANIC_HOOK: Once = Once::new();

/// Chains a panic hook that records panic locations for threads currently running a
/// hook or spec body, and defers to the previous hook everywhere else.
fn install_panic_hook() {
    INSTALL_PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if CAPTURING.with(Cell::get) {
                let location = info.location().map(|l| l.to_string());
                PANIC_LOCATION.with(|slot| *slot.borrow_mut() = location);
            } else {
                previous(info);
            }
        }));
    });
}

/// Runs the given function, turning a panic into a failed [`SpecResult`].
pub(crate) fn capture_failure(f: impl FnOnce() -> SpecResult) -> SpecResult {
    install_panic_hook();

    let was_capturing = CAPTURING.with(|c| c.replace(true));
    let result = std::panic::catch_unwind(AssertUnwindSafe(f));
    CAPTURING.with(|c| c.set(was_capturing));

    match result {
        Ok(result) => result,
        Err(payload) => {
            let location = PANIC_LOCATION.with(|slot| slot.borrow_mut().take());
            Err(ErrorRecord::from_panic(payload.as_ref(), location))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, thiserror::Error)]
    #[error("outer failure")]
    struct Outer(#[source] Inner);

    #[derive(Debug, thiserror::Error)]
    #[error("inner failure")]
    struct Inner;

    #[test]
    fn test_trace_rendering() {
        let record = ErrorRecord::new("expected true, got false")
            .with_frame("calculator.rs:10")
            .with_frame("{main}");

        assert_eq!(record.message(), "expected true, got false");
        assert_eq!(record.trace_as_string(), "#0 calculator.rs:10\n#1 {main}");
    }

    #[test]
    fn test_empty_trace() {
        assert_eq!(ErrorRecord::new("oops").trace_as_string(), "");
    }

    #[test]
    fn test_from_error_uses_source_chain() {
        let record = ErrorRecord::from(Outer(Inner));
        assert_eq!(record.message(), "outer failure");
        assert_eq!(record.frames(), ["inner failure".to_string()]);
    }

    #[test]
    fn test_question_mark_in_body() {
        fn body() -> SpecResult {
            let _: i32 = "nope".parse()?;
            Ok(())
        }

        let record = body().unwrap_err();
        assert_eq!(record.message(), "invalid digit found in string");
    }

    #[test]
    fn test_capture_panic() {
        let result = capture_failure(|| panic!("expected true, got false"));
        let record = result.unwrap_err();

        assert_eq!(record.message(), "expected true, got false");
        assert_eq!(record.frames().len(), 1);
        assert!(record.frames()[0].contains("results.rs"));
    }

    #[test]
    fn test_capture_formatted_panic() {
        let value = 3;
        let record = capture_failure(|| panic!("got {value}")).unwrap_err();
        assert_eq!(record.message(), "got 3");
    }

    #[test]
    fn test_capture_passes_through_results() {
        assert!(capture_failure(|| Ok(())).is_ok());
        assert_eq!(
            capture_failure(|| Err(ErrorRecord::new("failed"))),
            Err(ErrorRecord::new("failed"))
        );
    }
}
