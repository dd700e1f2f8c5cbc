//! # fob-css-rules
//!
//! Bundler rules for global CSS, CSS modules and arbitrary CSS pre-processors
//! (Sass, Less, Stylus, ...).
//!
//! The crate works at build-configuration time only: it appends an ordered
//! group of webpack-style rules to a [`BuildConfiguration`] so that
//!
//! - `*.module.<ext>` files are scoped CSS modules, importable from application
//!   code only,
//! - global stylesheets may only be imported from the custom app file (or from
//!   dependencies, by application code),
//! - every pre-processor's output goes through the same `css-loader` and
//!   PostCSS chain as plain CSS.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use fob_css_rules::{with_css, BuildConfiguration, BuildSession, PluginConfiguration, PreProcessors, WebpackContext};
//! use serde_json::json;
//!
//! # fn main() -> fob_css_rules::Result<()> {
//! let plugin = with_css(PluginConfiguration::default().pre_processors(PreProcessors::Static(json!([
//!     { "extensions": ["scss", "sass"], "use": ["sass-loader"] }
//! ]))));
//!
//! let session = Arc::new(BuildSession::new());
//! let server = plugin.webpack(BuildConfiguration::new(), &WebpackContext::new(".", session.clone()).server(true))?;
//! let client = plugin.webpack(BuildConfiguration::new(), &WebpackContext::new(".", session))?;
//! # let _ = (server, client);
//! # Ok(())
//! # }
//! ```

pub mod bundler;
pub mod context;
pub mod discovery;
pub mod error;
pub mod loaders;
pub mod messages;
pub mod plugin;
pub mod postcss;
pub mod rules;
pub mod validate;

pub use bundler::{BuildConfiguration, BundlerPlugin, Condition, Minimizer, Rule, RuleAction, UseItem};
pub use context::{BuildSession, ConfigurationContext, WebpackContext};
pub use discovery::{ConfigValue, FoundConfig, find_config, find_custom_app_file, find_pages_dir};
pub use error::{Error, Result};
pub use messages::{MemoryReporter, Message, MessageLevel, Reporter, TerminalReporter};
pub use plugin::{CssPlugin, PluginConfiguration, PreProcessors, WebpackHook, with_css};
pub use postcss::{PluginRegistry, PluginResolver, PluginSource, PostCssPlugin, load_postcss_plugins};
pub use rules::{PreProcessorMatcher, PreprocessorItem, configure_css};
pub use validate::validate_plugin_configuration;
