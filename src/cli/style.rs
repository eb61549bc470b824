//! Terminal styling helpers

use indicatif::ProgressStyle;
use owo_colors::OwoColorize;

/// Check mark for completed steps.
pub const CHECK: &str = "✓";

/// Cross mark for rejected items.
pub const CROSS: &str = "✗";

/// Extension trait for consistent styling of display values.
///
/// Colors are applied unconditionally; printing through `anstream` strips
/// them when the stream is not a terminal.
pub trait Stylize: std::fmt::Display {
    /// De-emphasized secondary text.
    fn muted(&self) -> String;
    /// Highlighted value (branch names, counts).
    fn accent(&self) -> String;
    /// Heading emphasis.
    fn emphasis(&self) -> String;
    /// Success messages.
    fn success(&self) -> String;
    /// Warnings.
    fn warn(&self) -> String;
    /// Errors.
    fn error(&self) -> String;
}

impl<T: std::fmt::Display> Stylize for T {
    fn muted(&self) -> String {
        format!("{}", self.dimmed())
    }

    fn accent(&self) -> String {
        format!("{}", self.cyan())
    }

    fn emphasis(&self) -> String {
        format!("{}", self.bold())
    }

    fn success(&self) -> String {
        format!("{}", self.green())
    }

    fn warn(&self) -> String {
        format!("{}", self.yellow())
    }

    fn error(&self) -> String {
        format!("{}", self.red())
    }
}

/// Green check mark.
pub fn check() -> String {
    CHECK.success()
}

/// Muted arrow for plan lines.
pub fn arrow() -> String {
    "→".muted()
}

/// Spinner style for network operations.
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}
