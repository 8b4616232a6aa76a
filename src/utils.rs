//! Supporting helpers for stderr prefixes.

use owo_colors::OwoColorize;

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Colored `error:` prefix for stderr diagnostics.
pub fn error_prefix() -> String {
    if colors_enabled() {
        "✖ error:".red().bold().to_string()
    } else {
        "✖ error:".to_string()
    }
}

/// Colored `note:` prefix for stderr diagnostics.
pub fn note_prefix() -> String {
    if colors_enabled() {
        "◆ note:".blue().bold().to_string()
    } else {
        "◆ note:".to_string()
    }
}

/// Colored `warn:` prefix for stderr diagnostics.
pub fn warn_prefix() -> String {
    if colors_enabled() {
        "▲ warn:".yellow().bold().to_string()
    } else {
        "▲ warn:".to_string()
    }
}
