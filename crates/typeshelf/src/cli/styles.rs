//! Terminal styles for the typeshelf CLI.
//!
//! Renderers ask for a semantic style (a font or template name, a path, a
//! message level) and never pick colors themselves, so the palette can change
//! in one place. `console` drops the escape codes when stdout is not a
//! terminal.

use console::Style;
use typeshelfapp::commands::MessageLevel;

/// Record names in lists and detail headers.
pub fn name() -> Style {
    Style::new().bold()
}

/// Filesystem paths.
pub fn path() -> Style {
    Style::new().cyan()
}

/// Metadata: timestamps, counts, categories.
pub fn muted() -> Style {
    Style::new().dim()
}

pub fn label() -> Style {
    Style::new().yellow()
}

pub fn message(level: &MessageLevel) -> Style {
    match level {
        MessageLevel::Info => Style::new().dim(),
        MessageLevel::Success => Style::new().green(),
        MessageLevel::Warning => Style::new().yellow().bold(),
        MessageLevel::Error => Style::new().red().bold(),
    }
}
