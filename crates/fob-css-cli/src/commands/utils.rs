//! Shared setup for command implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use fob_css_rules::{BuildConfiguration, BuildSession, CssPlugin, WebpackContext, with_css};

use crate::cli::{ProjectArgs, Target};
use crate::config::{ProjectConfig, resolve_root};
use crate::error::Result;

/// A project opened for one CLI invocation.
///
/// Every target configured through the same `Project` shares one
/// [`BuildSession`], the way a host's server and client passes do.
pub(crate) struct Project {
    pub root: PathBuf,
    pub dev: bool,
    plugin: CssPlugin,
    session: Arc<BuildSession>,
}

impl Project {
    pub fn open(args: &ProjectArgs) -> Result<Self> {
        let root = resolve_root(&args.root)?;
        let config = ProjectConfig::load(&root, args.config.as_deref())?;
        tracing::debug!(root = %root.display(), ?config, "loaded project configuration");

        Ok(Self {
            root,
            dev: args.dev,
            plugin: with_css(config.into_plugin_configuration()),
            session: Arc::new(BuildSession::new()),
        })
    }

    pub fn context(&self, target: Target) -> WebpackContext {
        WebpackContext::new(&self.root, self.session.clone())
            .dev(self.dev)
            .server(target.is_server())
    }

    /// Run the plugin's configuration hook for `target`.
    pub fn configure(&self, config: BuildConfiguration, target: Target) -> Result<BuildConfiguration> {
        Ok(self.plugin.webpack(config, &self.context(target))?)
    }

    /// Resolve a command-line path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

pub(crate) fn target_name(target: Target) -> &'static str {
    if target.is_server() { "server" } else { "client" }
}
