//! Configuration-extension entry point.
//!
//! [`with_css`] wraps a project's plugin configuration. The resulting
//! [`CssPlugin`] is invoked once per build target with the host's
//! [`BuildConfiguration`] and returns it with the CSS rules appended.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::bundler::BuildConfiguration;
use crate::context::{ConfigurationContext, WebpackContext};
use crate::discovery::{DEFAULT_PAGE_EXTENSIONS, find_custom_app_file};
use crate::error::Result;
use crate::rules::configure_css;
use crate::validate::validate_plugin_configuration;

pub type PreProcessorFactory = dyn Fn(&BuildConfiguration, &WebpackContext) -> Value + Send + Sync;

/// User hook run after the CSS rules are added; its result is the final configuration.
pub type WebpackHook =
    Arc<dyn Fn(BuildConfiguration, &WebpackContext) -> Result<BuildConfiguration> + Send + Sync>;

/// The `preProcessors` option: a descriptor list or a function producing one.
#[derive(Clone)]
pub enum PreProcessors {
    Static(Value),
    Factory(Arc<PreProcessorFactory>),
}

impl PreProcessors {
    pub fn factory<F>(f: F) -> Self
    where
        F: Fn(&BuildConfiguration, &WebpackContext) -> Value + Send + Sync + 'static,
    {
        PreProcessors::Factory(Arc::new(f))
    }
}

impl fmt::Debug for PreProcessors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreProcessors::Static(value) => f.debug_tuple("Static").field(value).finish(),
            PreProcessors::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfiguration {
    #[serde(default, deserialize_with = "deserialize_pre_processors")]
    pub pre_processors: Option<PreProcessors>,

    #[serde(default)]
    pub asset_prefix: Option<String>,

    #[serde(default = "default_page_extensions")]
    pub page_extensions: Vec<String>,

    #[serde(skip)]
    pub webpack: Option<WebpackHook>,

    /// Host configuration this crate does not interpret, passed through as is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_page_extensions() -> Vec<String> {
    DEFAULT_PAGE_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

fn deserialize_pre_processors<'de, D>(deserializer: D) -> std::result::Result<Option<PreProcessors>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.map(PreProcessors::Static))
}

impl Default for PluginConfiguration {
    fn default() -> Self {
        Self {
            pre_processors: None,
            asset_prefix: None,
            page_extensions: default_page_extensions(),
            webpack: None,
            extra: Map::new(),
        }
    }
}

impl PluginConfiguration {
    pub fn pre_processors(mut self, pre_processors: PreProcessors) -> Self {
        self.pre_processors = Some(pre_processors);
        self
    }

    pub fn asset_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.asset_prefix = Some(prefix.into());
        self
    }

    pub fn page_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.page_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn webpack<F>(mut self, hook: F) -> Self
    where
        F: Fn(BuildConfiguration, &WebpackContext) -> Result<BuildConfiguration> + Send + Sync + 'static,
    {
        self.webpack = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for PluginConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginConfiguration")
            .field("pre_processors", &self.pre_processors)
            .field("asset_prefix", &self.asset_prefix)
            .field("page_extensions", &self.page_extensions)
            .field("webpack", &self.webpack.as_ref().map(|_| ".."))
            .field("extra", &self.extra)
            .finish()
    }
}

/// Wrap a plugin configuration.
pub fn with_css(config: PluginConfiguration) -> CssPlugin {
    CssPlugin { config }
}

#[derive(Debug, Clone)]
pub struct CssPlugin {
    config: PluginConfiguration,
}

impl CssPlugin {
    pub fn configuration(&self) -> &PluginConfiguration {
        &self.config
    }

    /// Host configuration passed through untouched.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.config.extra
    }

    /// Extend `config` for the build target described by `ctx`.
    pub fn webpack(&self, mut config: BuildConfiguration, ctx: &WebpackContext) -> Result<BuildConfiguration> {
        let pre_processors =
            validate_plugin_configuration(self.config.pre_processors.as_ref(), &config, ctx)?;

        let configuration = ConfigurationContext::new(&ctx.dir)
            .development(ctx.dev)
            .server(ctx.is_server)
            .custom_app_file(find_custom_app_file(&ctx.dir, &self.config.page_extensions))
            .asset_prefix(self.config.asset_prefix.as_deref());

        tracing::debug!(
            build = ctx.target_name(),
            dev = ctx.dev,
            pre_processors = pre_processors.len(),
            "configuring CSS"
        );
        configure_css(&mut config, &pre_processors, &configuration, &ctx.session)?;

        match &self.config.webpack {
            Some(hook) => hook(config, ctx),
            None => Ok(config),
        }
    }
}
