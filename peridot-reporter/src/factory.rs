//! Named reporter registry.

use std::rc::Rc;

use indexmap::IndexMap;
use peridot_core::{EventBus, trace_categories};

use crate::anonymous::{AnonymousReporter, ReporterInit};
use crate::config::ReporterConfiguration;
use crate::error::Error;
use crate::output::SharedOutput;
use crate::reporter::{Reporter, ReporterBase};
use crate::spec_reporter::SpecReporter;

/// Name of the reporter used when none is requested.
pub const DEFAULT_REPORTER: &str = "spec";

struct Registration {
    description: String,
    init: Rc<ReporterInit>,
}

/// Creates reporters by name.
pub struct ReporterFactory {
    registrations: IndexMap<String, Registration>,
}

impl Default for ReporterFactory {
    fn default() -> Self {
        let mut factory = Self {
            registrations: IndexMap::new(),
        };

        factory.register(
            DEFAULT_REPORTER,
            "hierarchical spec list",
            |base: &ReporterBase| SpecReporter::new().init(base),
        );

        factory
    }
}

impl ReporterFactory {
    /// Returns a factory with the built-in reporters registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a reporter under the given name, replacing any previous registration
    /// with that name.
    ///
    /// # Arguments
    ///
    /// * `name` - The name the reporter is selected by.
    /// * `description` - One-line summary shown in reporter listings.
    /// * `init` - Subscribes the reporter's listeners on the base it is handed.
    pub fn register<F>(&mut self, name: impl Into<String>, description: impl Into<String>, init: F)
    where
        F: Fn(&ReporterBase) -> Result<(), Error> + 'static,
    {
        let name = name.into();
        tracing::debug!(target: trace_categories::REPORTER, "registering reporter '{name}'");

        self.registrations.insert(
            name,
            Registration {
                description: description.into(),
                init: Rc::new(init),
            },
        );
    }

    /// Returns the name and description of every registered reporter, in registration
    /// order.
    pub fn reporters(&self) -> Vec<(&str, &str)> {
        self.registrations
            .iter()
            .map(|(name, r)| (name.as_str(), r.description.as_str()))
            .collect()
    }

    /// Returns whether a reporter is registered under the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.registrations.contains_key(name)
    }

    /// Creates and initializes the named reporter on the given bus.
    ///
    /// # Arguments
    ///
    /// * `name` - The registered name of the reporter.
    /// * `configuration` - Supplies the color setting.
    /// * `output` - Where the reporter writes.
    /// * `event_bus` - The bus the run emits on.
    pub fn create(
        &self,
        name: &str,
        configuration: Rc<dyn ReporterConfiguration>,
        output: SharedOutput,
        event_bus: EventBus,
    ) -> Result<ReporterBase, Error> {
        let registration = self
            .registrations
            .get(name)
            .ok_or_else(|| Error::UnknownReporter(name.to_owned()))?;

        tracing::debug!(target: trace_categories::REPORTER, "creating reporter '{name}'");

        let reporter = AnonymousReporter::from_shared(registration.init.clone());
        ReporterBase::new(configuration, output, event_bus, &reporter)
    }
}

impl std::fmt::Debug for ReporterFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.registrations.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::config::StaticConfiguration;
    use crate::output::BufferedOutput;
    use peridot_core::{Event, EventName};
    use pretty_assertions::{assert_eq, assert_matches};

    fn create(
        factory: &ReporterFactory,
        name: &str,
    ) -> Result<(ReporterBase, EventBus, Rc<RefCell<BufferedOutput>>), Error> {
        let bus = EventBus::new();
        let buffer = Rc::new(RefCell::new(BufferedOutput::new()));
        let base = factory.create(
            name,
            Rc::new(StaticConfiguration::default()),
            buffer.clone(),
            bus.clone(),
        )?;
        Ok((base, bus, buffer))
    }

    #[test]
    fn test_spec_is_preregistered() -> anyhow::Result<()> {
        let factory = ReporterFactory::new();
        assert_eq!(factory.reporters(), vec![("spec", "hierarchical spec list")]);

        let (_base, bus, buffer) = create(&factory, "spec")?;
        bus.emit(&Event::RunnerStart)?;
        assert_eq!(buffer.borrow().contents(), "\n");

        Ok(())
    }

    #[test]
    fn test_unknown_reporter() {
        let factory = ReporterFactory::new();
        assert!(!factory.contains("dot"));
        assert_matches!(
            create(&factory, "dot"),
            Err(Error::UnknownReporter(name)) if name == "dot"
        );
    }

    #[test]
    fn test_custom_registration() -> anyhow::Result<()> {
        let mut factory = ReporterFactory::new();
        factory.register("basic", "a simple summary", |base| {
            let b = base.clone();
            base.event_bus().on(EventName::RunnerEnd, move |_| {
                b.output()
                    .borrow_mut()
                    .writeln(&format!("{} passing", b.passing()))?;
                Ok(())
            });
            Ok(())
        });

        assert_eq!(
            factory.reporters(),
            vec![
                ("spec", "hierarchical spec list"),
                ("basic", "a simple summary")
            ]
        );

        let (base, bus, buffer) = create(&factory, "basic")?;
        bus.emit(&Event::RunnerStart)?;
        bus.emit(&Event::RunnerEnd)?;

        assert_eq!(buffer.borrow().contents(), "0 passing\n");
        assert_eq!(base.passing(), 0);

        Ok(())
    }

    #[test]
    fn test_registration_replaces_by_name() {
        let mut factory = ReporterFactory::new();
        factory.register("spec", "replaced", |_| Ok(()));

        assert_eq!(factory.reporters(), vec![("spec", "replaced")]);
    }
}
