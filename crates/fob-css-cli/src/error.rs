//! Error handling for the `fob-css` CLI.
//!
//! Library errors are wrapped unchanged so their diagnostic codes and help
//! text survive to the terminal; configuration loading problems carry a hint.

mod miette;

use std::path::PathBuf;

use thiserror::Error;

pub use self::miette::cli_error_to_miette;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rule construction failed.
    #[error(transparent)]
    Rules(#[from] fob_css_rules::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {}\n\nHint: Create fob-css.toml in the project root or pass an existing file to --config", .0.display())]
    NotFound(PathBuf),

    /// The merged configuration does not have the expected shape.
    #[error("Invalid configuration: {message}\n\nHint: {hint}")]
    Invalid { message: String, hint: String },

    #[error("Project root does not exist: {}", .0.display())]
    RootNotFound(PathBuf),
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;
