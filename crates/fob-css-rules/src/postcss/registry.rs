//! Resolution of PostCSS plugin names.
//!
//! Plugins are never loaded as code. A [`PluginRegistry`] only answers where a
//! plugin name comes from, so the transform chain can reference it
//! declaratively.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Plugins shipped with the toolchain, usable without a `node_modules` install.
pub const BUNDLED_PLUGINS: [&str; 2] = ["postcss-flexbugs-fixes", "postcss-preset-env"];

/// Where a resolved plugin comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginSource {
    Bundled,
    Path(PathBuf),
}

impl PluginSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            PluginSource::Bundled => None,
            PluginSource::Path(path) => Some(path),
        }
    }
}

/// Looks up a plugin by name for a project rooted at `root`.
pub trait PluginResolver: fmt::Debug + Send + Sync {
    fn resolve(&self, name: &str, root: &Path) -> Option<PluginSource>;
}

/// A fixed set of plugin names that always resolve.
#[derive(Debug, Clone)]
pub struct BundledPlugins {
    names: BTreeSet<String>,
}

impl BundledPlugins {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for BundledPlugins {
    fn default() -> Self {
        Self::new(BUNDLED_PLUGINS)
    }
}

impl PluginResolver for BundledPlugins {
    fn resolve(&self, name: &str, _root: &Path) -> Option<PluginSource> {
        self.names.contains(name).then_some(PluginSource::Bundled)
    }
}

/// Finds `node_modules/<name>` in the root or any of its ancestors.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeModulesResolver;

impl PluginResolver for NodeModulesResolver {
    fn resolve(&self, name: &str, root: &Path) -> Option<PluginSource> {
        root.ancestors()
            .map(|dir| dir.join("node_modules").join(name))
            .find(|candidate| candidate.is_dir())
            .map(PluginSource::Path)
    }
}

/// Ordered list of resolvers; the first that knows a name wins.
///
/// The default registry knows the bundled plugins, then looks in
/// `node_modules`.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use fob_css_rules::{PluginRegistry, PluginSource};
/// use fob_css_rules::postcss::BundledPlugins;
///
/// let registry = PluginRegistry::empty().with_resolver(BundledPlugins::new(["tailwindcss"]));
/// assert_eq!(registry.resolve("tailwindcss", Path::new("/app")), Some(PluginSource::Bundled));
/// assert_eq!(registry.resolve("postcss-nested", Path::new("/app")), None);
/// ```
#[derive(Debug, Clone)]
pub struct PluginRegistry {
    resolvers: Vec<Arc<dyn PluginResolver>>,
}

impl PluginRegistry {
    /// A registry that resolves nothing.
    pub fn empty() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    pub fn with_resolver(mut self, resolver: impl PluginResolver + 'static) -> Self {
        self.resolvers.push(Arc::new(resolver));
        self
    }

    pub fn resolve(&self, name: &str, root: &Path) -> Option<PluginSource> {
        let source = self
            .resolvers
            .iter()
            .find_map(|resolver| resolver.resolve(name, root));
        tracing::trace!(name, ?source, "resolved PostCSS plugin");
        source
    }
}

/// Bundled plugins first, then `node_modules`.
impl Default for PluginRegistry {
    fn default() -> Self {
        Self::empty()
            .with_resolver(BundledPlugins::default())
            .with_resolver(NodeModulesResolver)
    }
}
