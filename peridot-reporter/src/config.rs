//! The configuration view consumed by reporters.

/// Settings a reporter needs from the surrounding configuration.
pub trait ReporterConfiguration {
    /// Returns whether output should be colorized.
    fn are_colors_enabled(&self) -> bool;
}

/// A fixed configuration, for embedding reporters without a full harness.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticConfiguration {
    /// Whether output should be colorized.
    pub colors_enabled: bool,
}

impl StaticConfiguration {
    /// Returns a configuration with colors enabled or disabled.
    pub const fn new(colors_enabled: bool) -> Self {
        Self { colors_enabled }
    }
}

impl ReporterConfiguration for StaticConfiguration {
    fn are_colors_enabled(&self) -> bool {
        self.colors_enabled
    }
}
