//! Status lines on stderr.

use owo_colors::{OwoColorize, Stream};

/// Apply `--no-color` and the `NO_COLOR` / `FORCE_COLOR` conventions.
pub fn init_colors(no_color: bool) {
    if no_color || std::env::var_os("NO_COLOR").is_some() {
        owo_colors::set_override(false);
    } else if std::env::var_os("FORCE_COLOR").is_some() {
        owo_colors::set_override(true);
    }
}

pub fn success(message: &str) {
    eprintln!(
        "{} {}",
        "✓".if_supports_color(Stream::Stderr, |t| t.green().bold().to_string()),
        message
    );
}

pub fn info(message: &str) {
    eprintln!(
        "{} {}",
        "ℹ".if_supports_color(Stream::Stderr, |t| t.blue().bold().to_string()),
        message
    );
}

pub fn warning(message: &str) {
    eprintln!(
        "{} {}",
        "⚠".if_supports_color(Stream::Stderr, |t| t.yellow().bold().to_string()),
        message.if_supports_color(Stream::Stderr, |t| t.yellow().to_string())
    );
}

pub fn error(message: &str) {
    eprintln!(
        "{} {}",
        "✗".if_supports_color(Stream::Stderr, |t| t.red().bold().to_string()),
        message.if_supports_color(Stream::Stderr, |t| t.red().to_string())
    );
}

