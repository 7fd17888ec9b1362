//! Synchronous, ordered publish/subscribe channel connecting traversal to reporting.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::Error;
use crate::node::SpecNode;
use crate::results::ErrorRecord;
use crate::trace_categories;

/// Names of the lifecycle events emitted during a run.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
    strum_macros::IntoStaticStr,
)]
pub enum EventName {
    /// Emitted once, before traversal begins.
    #[strum(serialize = "runner.start")]
    RunnerStart,
    /// Emitted once, after traversal completes.
    #[strum(serialize = "runner.end")]
    RunnerEnd,
    /// Emitted before a suite's children run.
    #[strum(serialize = "suite.start")]
    SuiteStart,
    /// Emitted after a suite's children ran.
    #[strum(serialize = "suite.end")]
    SuiteEnd,
    /// Emitted before a spec's hooks and body run.
    #[strum(serialize = "spec.start")]
    SpecStart,
    /// Emitted when a spec's body and hooks completed without error.
    #[strum(serialize = "spec.passed")]
    SpecPassed,
    /// Emitted when a spec's body or one of its hooks failed.
    #[strum(serialize = "spec.failed")]
    SpecFailed,
    /// Emitted when a spec resolved to pending.
    #[strum(serialize = "spec.pending")]
    SpecPending,
}

/// A lifecycle event together with its payload.
#[derive(Clone, Debug)]
pub enum Event {
    /// Traversal is about to begin.
    RunnerStart,
    /// Traversal has completed.
    RunnerEnd,
    /// The given suite is about to run its children.
    SuiteStart(Rc<SpecNode>),
    /// The given suite has run its children.
    SuiteEnd(Rc<SpecNode>),
    /// The given spec is about to run.
    SpecStart(Rc<SpecNode>),
    /// The given spec passed.
    SpecPassed(Rc<SpecNode>),
    /// The given spec failed with the given record.
    SpecFailed(Rc<SpecNode>, Rc<ErrorRecord>),
    /// The given spec is pending.
    SpecPending(Rc<SpecNode>),
}

impl Event {
    /// Returns the name under which this event is dispatched.
    pub const fn name(&self) -> EventName {
        match self {
            Self::RunnerStart => EventName::RunnerStart,
            Self::RunnerEnd => EventName::RunnerEnd,
            Self::SuiteStart(_) => EventName::SuiteStart,
            Self::SuiteEnd(_) => EventName::SuiteEnd,
            Self::SpecStart(_) => EventName::SpecStart,
            Self::SpecPassed(_) => EventName::SpecPassed,
            Self::SpecFailed(..) => EventName::SpecFailed,
            Self::SpecPending(_) => EventName::SpecPending,
        }
    }

    /// Returns the node this event is about, if any.
    pub const fn node(&self) -> Option<&Rc<SpecNode>> {
        match self {
            Self::RunnerStart | Self::RunnerEnd => None,
            Self::SuiteStart(node)
            | Self::SuiteEnd(node)
            | Self::SpecStart(node)
            | Self::SpecPassed(node)
            | Self::SpecFailed(node, _)
            | Self::SpecPending(node) => Some(node),
        }
    }
}

/// Result returned by event listeners.
pub type ListenerResult = Result<(), Error>;

type Listener = Rc<RefCell<dyn FnMut(&Event) -> ListenerResult>>;

/// A cloneable handle to a single-threaded event bus.
///
/// Listeners run synchronously, in registration order, before [`EventBus::emit`]
/// returns. A failing listener stops delivery of that event and its error surfaces to
/// the caller of `emit`.
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Rc<RefCell<HashMap<EventName, Vec<Listener>>>>,
}

impl EventBus {
    /// Returns a new bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for the named event.
    ///
    /// # Arguments
    ///
    /// * `name` - The event to listen for.
    /// * `listener` - The function to invoke on each emission.
    pub fn on<F>(&self, name: EventName, listener: F)
    where
        F: FnMut(&Event) -> ListenerResult + 'static,
    {
        tracing::trace!(target: trace_categories::EVENTS, "registering listener for {name}");

        let listener: Listener = Rc::new(RefCell::new(listener));
        self.listeners
            .borrow_mut()
            .entry(name)
            .or_default()
            .push(listener);
    }

    /// Delivers the event to every listener registered for its name.
    ///
    /// # Arguments
    ///
    /// * `event` - The event to deliver.
    pub fn emit(&self, event: &Event) -> Result<(), Error> {
        let name = event.name();

        // Dispatch over a snapshot so that listeners registered while this event is
        // in flight only see later emissions.
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .get(&name)
            .cloned()
            .unwrap_or_default();

        tracing::trace!(
            target: trace_categories::EVENTS,
            "emitting {name} to {} listener(s)",
            snapshot.len()
        );

        for listener in snapshot {
            let mut listener = listener
                .try_borrow_mut()
                .map_err(|_| Error::ReentrantListener(name))?;
            (&mut *listener)(event)?;
        }

        Ok(())
    }

    /// Returns the number of listeners registered for the named event.
    pub fn listener_count(&self, name: EventName) -> usize {
        self.listeners.borrow().get(&name).map_or(0, Vec::len)
    }

    /// Removes every listener registered for the named event.
    pub fn remove_all_listeners(&self, name: EventName) {
        self.listeners.borrow_mut().remove(&name);
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.borrow();
        f.debug_map()
            .entries(listeners.iter().map(|(name, l)| (name, l.len())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::str::FromStr;

    use super::*;
    use crate::error::listener_failure;
    use pretty_assertions::{assert_eq, assert_matches};
    use strum::IntoEnumIterator;

    fn recorder(
        log: Rc<RefCell<Vec<String>>>,
        tag: &'static str,
    ) -> impl FnMut(&Event) -> ListenerResult {
        move |event| {
            log.borrow_mut().push(format!("{tag}:{}", event.name()));
            Ok(())
        }
    }

    #[test]
    fn test_event_names() {
        assert_eq!(EventName::RunnerStart.to_string(), "runner.start");
        assert_eq!(EventName::SpecFailed.to_string(), "spec.failed");
        assert_eq!(EventName::from_str("spec.pending").ok(), Some(EventName::SpecPending));
        assert!(EventName::from_str("spec.exploded").is_err());

        for name in EventName::iter() {
            assert_eq!(EventName::from_str(&name.to_string()).ok(), Some(name));
        }
    }

    #[test]
    fn test_delivery_in_registration_order() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(vec![]));

        bus.on(EventName::RunnerStart, recorder(log.clone(), "first"));
        bus.on(EventName::RunnerStart, recorder(log.clone(), "second"));
        bus.on(EventName::RunnerEnd, recorder(log.clone(), "other"));

        bus.emit(&Event::RunnerStart).unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["first:runner.start".to_string(), "second:runner.start".to_string()]
        );
    }

    #[test]
    fn test_emit_without_listeners() {
        let bus = EventBus::new();
        assert!(bus.emit(&Event::RunnerEnd).is_ok());
        assert_eq!(bus.listener_count(EventName::RunnerEnd), 0);
    }

    #[test]
    fn test_failing_listener_halts_delivery() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(vec![]));

        bus.on(EventName::RunnerEnd, recorder(log.clone(), "before"));
        bus.on(EventName::RunnerEnd, |_| {
            listener_failure(EventName::RunnerEnd, "boom")
        });
        bus.on(EventName::RunnerEnd, recorder(log.clone(), "after"));

        let result = bus.emit(&Event::RunnerEnd);

        assert_matches!(result, Err(Error::Listener { event: EventName::RunnerEnd, .. }));
        assert_eq!(*log.borrow(), vec!["before:runner.end".to_string()]);
    }

    #[test]
    fn test_registration_during_dispatch_applies_to_next_emit() {
        let bus = EventBus::new();
        let calls = Rc::new(Cell::new(0));

        let inner_bus = bus.clone();
        let inner_calls = calls.clone();
        bus.on(EventName::RunnerStart, move |_| {
            let calls = inner_calls.clone();
            inner_bus.on(EventName::RunnerStart, move |_| {
                calls.set(calls.get() + 1);
                Ok(())
            });
            Ok(())
        });

        bus.emit(&Event::RunnerStart).unwrap();
        assert_eq!(calls.get(), 0);
        assert_eq!(bus.listener_count(EventName::RunnerStart), 2);

        bus.emit(&Event::RunnerStart).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_reentrant_listener_is_an_error() {
        let bus = EventBus::new();
        let inner_bus = bus.clone();
        bus.on(EventName::RunnerStart, move |event| inner_bus.emit(event));

        assert_matches!(
            bus.emit(&Event::RunnerStart),
            Err(Error::ReentrantListener(EventName::RunnerStart))
        );
    }

    #[test]
    fn test_remove_all_listeners() {
        let bus = EventBus::new();
        bus.on(EventName::SpecPassed, |_| Ok(()));
        bus.on(EventName::SpecPassed, |_| Ok(()));
        assert_eq!(bus.listener_count(EventName::SpecPassed), 2);

        bus.remove_all_listeners(EventName::SpecPassed);
        assert_eq!(bus.listener_count(EventName::SpecPassed), 0);
    }

    #[test]
    fn test_event_payloads() {
        let spec = SpecNode::spec("adds", |_| Ok(()));
        let event = Event::SpecFailed(spec.clone(), Rc::new(ErrorRecord::new("nope")));

        assert_eq!(event.name(), EventName::SpecFailed);
        assert!(Rc::ptr_eq(event.node().unwrap(), &spec));
        assert!(Event::RunnerStart.node().is_none());
    }
}
