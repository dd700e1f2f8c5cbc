//! Framed terminal messages.
//!
//! Every advisory and error this crate produces is a [`Message`]: a level, a body
//! and an optional documentation link. Messages are handed to a [`Reporter`],
//! which decides where they go. [`TerminalReporter`] renders them as framed
//! blocks:
//!
//! ```text
//! ┏━━━━━━ warning ━━━━━━
//!  [fob-css-rules]
//!
//!   The value given to preProcessors is null or undefined. ...
//! ┗━━━━━━━━━━━━━━━━━━━━━
//! ```

use std::fmt;

use owo_colors::{OwoColorize, Stream};
use parking_lot::Mutex;
use serde::Serialize;

/// Tag printed under every message label.
pub const PACKAGE_TAG: &str = "[fob-css-rules]";

/// Wrap width used when the terminal width is unknown, and the upper bound otherwise.
pub const MAX_WIDTH: usize = 78;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Error,
    Warning,
    Info,
}

impl MessageLevel {
    fn opening(self) -> &'static str {
        match self {
            MessageLevel::Error => "┏━━━━━━━ error ━━━━━━━",
            MessageLevel::Warning => "┏━━━━━━ warning ━━━━━━",
            MessageLevel::Info => "┏━━━━━━━━ info ━━━━━━━",
        }
    }

    fn closing(self) -> &'static str {
        "┗━━━━━━━━━━━━━━━━━━━━━"
    }
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageLevel::Error => "error",
            MessageLevel::Warning => "warning",
            MessageLevel::Info => "info",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub level: MessageLevel,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_link: Option<String>,
}

impl Message {
    pub fn new(level: MessageLevel, body: impl Into<String>) -> Self {
        Self {
            level,
            body: body.into(),
            help_link: None,
        }
    }

    pub fn error(body: impl Into<String>) -> Self {
        Self::new(MessageLevel::Error, body)
    }

    pub fn warning(body: impl Into<String>) -> Self {
        Self::new(MessageLevel::Warning, body)
    }

    pub fn info(body: impl Into<String>) -> Self {
        Self::new(MessageLevel::Info, body)
    }

    pub fn with_help_link(mut self, link: impl Into<String>) -> Self {
        self.help_link = Some(link.into());
        self
    }

    /// Render the framed block without colors, wrapped to `width` columns.
    pub fn render(&self, width: usize) -> String {
        self.render_with(width, false)
    }

    /// Render the framed block for stderr, colored when the stream supports it.
    pub fn render_for_terminal(&self) -> String {
        self.render_with(terminal_width(), true)
    }

    fn render_with(&self, width: usize, colored: bool) -> String {
        let level = self.level;
        let frame = |label: &str| -> String {
            if !colored {
                return label.to_string();
            }
            label
                .if_supports_color(Stream::Stderr, |t| match level {
                    MessageLevel::Error => t.red().bold().to_string(),
                    MessageLevel::Warning => t.yellow().bold().to_string(),
                    MessageLevel::Info => t.blue().bold().to_string(),
                })
                .to_string()
        };
        let tag = if colored {
            PACKAGE_TAG
                .if_supports_color(Stream::Stderr, |t| t.dimmed().to_string())
                .to_string()
        } else {
            PACKAGE_TAG.to_string()
        };

        let body = textwrap::wrap(&self.body, width.max(1)).join("\n  ");
        let suffix = match &self.help_link {
            Some(link) => format!("\n\n  Read more: {link}"),
            None => String::new(),
        };

        format!(
            "\n\n{}\n {}\n\n  {}{}\n{}\n\n",
            frame(level.opening()),
            tag,
            body,
            suffix,
            frame(level.closing()),
        )
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(MAX_WIDTH))
    }
}

/// Current terminal width capped at [`MAX_WIDTH`], or [`MAX_WIDTH`] when unknown.
pub fn terminal_width() -> usize {
    console::Term::stdout()
        .size_checked()
        .map(|(_, cols)| usize::from(cols).min(MAX_WIDTH))
        .unwrap_or(MAX_WIDTH)
}

/// Destination for messages produced while configuring a build.
pub trait Reporter: Send + Sync {
    fn report(&self, message: &Message);
}

/// Prints framed messages: errors and warnings to stderr, info to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalReporter;

impl Reporter for TerminalReporter {
    fn report(&self, message: &Message) {
        tracing::debug!(level = %message.level, "reporting message");
        let rendered = message.render_for_terminal();
        match message.level {
            MessageLevel::Error | MessageLevel::Warning => eprintln!("{rendered}"),
            MessageLevel::Info => println!("{rendered}"),
        }
    }
}

/// Collects messages in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    messages: Mutex<Vec<Message>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().clone()
    }

    pub fn count(&self, level: MessageLevel) -> usize {
        self.messages
            .lock()
            .iter()
            .filter(|m| m.level == level)
            .count()
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, message: &Message) {
        self.messages.lock().push(message.clone());
    }
}
