//! Error types for CSS rule construction.
//!
//! Every fatal misconfiguration is first reported through the session's
//! [`Reporter`](crate::messages::Reporter) as a framed message, then surfaced as
//! one of these variants so the build halts.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// The `preProcessors` option has the wrong shape.
    #[error("Malformed plugin configuration: {reason}")]
    #[diagnostic(
        code(fob::css::malformed_plugin_config),
        help("Each pre-processor needs a non-empty `extensions` array of strings and a non-empty `use` array of loaders")
    )]
    MalformedPluginConfiguration { reason: String },

    /// The PostCSS configuration has the wrong shape.
    #[error("Malformed PostCSS configuration: {reason}")]
    #[diagnostic(code(fob::css::malformed_postcss_config))]
    MalformedPostCssConfiguration {
        reason: String,
        #[help]
        help_link: Option<String>,
    },

    /// A PostCSS plugin named in the configuration could not be resolved.
    #[error("PostCSS plugin '{name}' could not be resolved from {}", .root.display())]
    #[diagnostic(
        code(fob::css::plugin_not_found),
        help("Install the plugin with your package manager, or remove it from your PostCSS configuration")
    )]
    PluginNotFound { name: String, root: PathBuf },

    /// A configuration file exists but could not be parsed.
    #[error("Failed to parse {}: {message}", .path.display())]
    #[diagnostic(code(fob::css::config_parse))]
    ConfigParse { path: PathBuf, message: String },

    /// Reading a configuration file failed.
    #[error("Failed to read {}: {source}", .path.display())]
    #[diagnostic(code(fob::css::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file pattern built from the configured extensions failed to compile.
    #[error("Invalid file pattern: {0}")]
    #[diagnostic(code(fob::css::pattern))]
    Pattern(#[from] regex::Error),

    /// Loader options could not be converted to JSON.
    #[error("Failed to serialize loader options: {0}")]
    #[diagnostic(code(fob::css::serialize))]
    Serialize(#[from] serde_json::Error),

    /// Raised by a user-supplied configuration hook.
    #[error("{0}")]
    #[diagnostic(code(fob::css::hook))]
    Hook(String),
}

impl Error {
    pub fn malformed_plugin_configuration(reason: impl Into<String>) -> Self {
        Self::MalformedPluginConfiguration {
            reason: reason.into(),
        }
    }

    pub fn malformed_postcss(reason: impl Into<String>, help_link: Option<&str>) -> Self {
        Self::MalformedPostCssConfiguration {
            reason: reason.into(),
            help_link: help_link.map(str::to_string),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config_parse(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::ConfigParse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_plugin_configuration_mentions_reason() {
        let err = Error::malformed_plugin_configuration("preProcessors[0].use is empty");
        let msg = err.to_string();
        assert!(msg.contains("Malformed plugin configuration"));
        assert!(msg.contains("preProcessors[0].use"));
    }

    #[test]
    fn plugin_not_found_mentions_name_and_root() {
        let err = Error::PluginNotFound {
            name: "postcss-nested".to_string(),
            root: PathBuf::from("/app"),
        };
        let msg = err.to_string();
        assert!(msg.contains("postcss-nested"));
        assert!(msg.contains("/app"));
    }

    #[test]
    fn postcss_error_carries_help_link() {
        let err = Error::malformed_postcss("function export", Some("https://err.sh/next.js/postcss-function"));
        assert_eq!(
            err.help().map(|h| h.to_string()).as_deref(),
            Some("https://err.sh/next.js/postcss-function")
        );
    }
}
