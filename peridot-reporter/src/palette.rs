//! Colors and symbols available to reporters.

use colored::Color;

/// Sequence that ends any colored span.
const RESET: &str = "\x1b[0m";

/// Keys of the fixed reporter palette.
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
)]
#[strum(serialize_all = "lowercase")]
pub enum ColorKey {
    /// Plain emphasis, used for suite descriptions.
    White,
    /// Passing results.
    Success,
    /// Failing results.
    Error,
    /// De-emphasized detail such as timings and traces.
    Muted,
    /// Pending results.
    Pending,
}

impl ColorKey {
    const fn color(self) -> Color {
        match self {
            Self::White => Color::White,
            Self::Success => Color::Green,
            Self::Error => Color::Red,
            Self::Muted => Color::BrightBlack,
            Self::Pending => Color::Cyan,
        }
    }

    /// Returns the sequence placed before text colored with this key.
    pub fn left(self) -> String {
        format!("\x1b[{}m", self.color().to_fg_str())
    }

    /// Returns the sequence placed after text colored with this key.
    pub const fn right(self) -> &'static str {
        RESET
    }

    /// Wraps the given text in this key's markers.
    pub fn wrap(self, text: &str) -> String {
        format!("{}{text}{}", self.left(), self.right())
    }
}

/// Named glyphs available to reporters.
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
)]
#[strum(serialize_all = "lowercase")]
pub enum Symbol {
    /// Marks a passing spec.
    Check,
}

impl Symbol {
    /// Returns the glyph for this symbol.
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Check => "✓",
        }
    }
}
