//! Project configuration.
//!
//! Sources, lowest priority first: built-in defaults, `fob-css.toml` or
//! `fob-css.json` in the project root (or the file given with `--config`),
//! then `FOB_CSS_*` environment variables.
//!
//! ```toml
//! asset_prefix = "https://cdn.example.com"
//! page_extensions = ["tsx", "mdx"]
//!
//! [[pre_processors]]
//! extensions = ["scss", "sass"]
//! use = ["sass-loader"]
//! ```

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
};
use fob_css_rules::discovery::DEFAULT_PAGE_EXTENSIONS;
use fob_css_rules::{PluginConfiguration, PreProcessors};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};

pub const TOML_FILE: &str = "fob-css.toml";
pub const JSON_FILE: &str = "fob-css.json";
pub const ENV_PREFIX: &str = "FOB_CSS_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Pre-processor descriptors, validated when the rules are built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_processors: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_prefix: Option<String>,

    pub page_extensions: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            pre_processors: None,
            asset_prefix: None,
            page_extensions: DEFAULT_PAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl ProjectConfig {
    /// Load the configuration for the project at `root`.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = Self::config_file(root, explicit)? {
            tracing::debug!(path = %path.display(), "loading configuration file");
            figment = if path.extension().is_some_and(|ext| ext == "json") {
                figment.merge(Json::file(path))
            } else {
                figment.merge(Toml::file(path))
            };
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        figment.extract().map_err(|e| {
            ConfigError::Invalid {
                message: e.to_string(),
                hint: format!("Check {TOML_FILE} syntax and field types"),
            }
            .into()
        })
    }

    /// The file to read: `explicit` if given, else the first default file present.
    pub fn config_file(root: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()).into());
            }
            return Ok(Some(path.to_path_buf()));
        }

        Ok([TOML_FILE, JSON_FILE]
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file()))
    }

    pub fn into_plugin_configuration(self) -> PluginConfiguration {
        let mut config = PluginConfiguration::default().page_extensions(self.page_extensions);
        config.pre_processors = self.pre_processors.map(PreProcessors::Static);
        config.asset_prefix = self.asset_prefix;
        config
    }
}

/// Absolute path of the project root.
pub fn resolve_root(root: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(root).map_err(|_| ConfigError::RootNotFound(root.to_path_buf()).into())
}
