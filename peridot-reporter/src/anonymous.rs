//! Reporters defined by a closure.

use std::fmt;
use std::rc::Rc;

use crate::error::Error;
use crate::reporter::{Reporter, ReporterBase};

/// Signature of a closure that initializes a reporter.
pub type ReporterInit = dyn Fn(&ReporterBase) -> Result<(), Error>;

/// A reporter whose initialization is supplied as a closure.
#[derive(Clone)]
pub struct AnonymousReporter {
    init: Rc<ReporterInit>,
}

impl AnonymousReporter {
    /// Wraps the given initialization closure.
    pub fn new<F>(init: F) -> Self
    where
        F: Fn(&ReporterBase) -> Result<(), Error> + 'static,
    {
        Self {
            init: Rc::new(init),
        }
    }

    pub(crate) fn from_shared(init: Rc<ReporterInit>) -> Self {
        Self { init }
    }
}

impl Reporter for AnonymousReporter {
    fn init(&self, base: &ReporterBase) -> Result<(), Error> {
        (self.init)(base)
    }
}

impl fmt::Debug for AnonymousReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnonymousReporter").finish_non_exhaustive()
    }
}
