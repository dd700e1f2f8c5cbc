//! Command-line front-end for `fob-css-rules`.
//!
//! Loads a project's plugin configuration (`fob-css.toml`, `fob-css.json` or
//! `FOB_CSS_*` environment variables), runs the configuration hook for a build
//! target and prints, checks or explains the resulting rules.
//!
//! - [`cli`] - argument definitions
//! - [`commands`] - `rules`, `check` and `explain`
//! - [`config`] - figment-based configuration loading
//! - [`error`] - error types and miette conversion
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines on stderr

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result};
