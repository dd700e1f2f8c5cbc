//! Build contexts.
//!
//! [`WebpackContext`] is what the host hands to a configuration hook for one
//! build target. [`ConfigurationContext`] is the read-only snapshot derived from
//! it that rule construction works from. [`BuildSession`] is the state shared by
//! the server and client invocations of one build.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::messages::{Message, Reporter, TerminalReporter};
use crate::postcss::PluginRegistry;

/// Context passed by the host to a configuration hook.
#[derive(Clone)]
pub struct WebpackContext {
    /// Project root.
    pub dir: PathBuf,
    pub dev: bool,
    pub is_server: bool,
    pub build_id: String,
    pub total_pages: usize,
    pub session: Arc<BuildSession>,
}

impl WebpackContext {
    pub fn new(dir: impl Into<PathBuf>, session: Arc<BuildSession>) -> Self {
        Self {
            dir: dir.into(),
            dev: false,
            is_server: false,
            build_id: String::new(),
            total_pages: 0,
            session,
        }
    }

    pub fn dev(mut self, dev: bool) -> Self {
        self.dev = dev;
        self
    }

    pub fn server(mut self, is_server: bool) -> Self {
        self.is_server = is_server;
        self
    }

    pub fn build_id(mut self, build_id: impl Into<String>) -> Self {
        self.build_id = build_id.into();
        self
    }

    pub fn total_pages(mut self, total_pages: usize) -> Self {
        self.total_pages = total_pages;
        self
    }

    pub fn target_name(&self) -> &'static str {
        if self.is_server { "server" } else { "client" }
    }
}

impl fmt::Debug for WebpackContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebpackContext")
            .field("dir", &self.dir)
            .field("dev", &self.dev)
            .field("is_server", &self.is_server)
            .field("build_id", &self.build_id)
            .field("total_pages", &self.total_pages)
            .finish_non_exhaustive()
    }
}

/// Read-only snapshot rule construction works from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationContext {
    pub root_directory: PathBuf,
    pub custom_app_file: Option<PathBuf>,
    pub is_development: bool,
    pub is_production: bool,
    pub is_server: bool,
    pub is_client: bool,
    /// Asset prefix without a trailing slash; empty when unset.
    pub asset_prefix: String,
}

impl ConfigurationContext {
    /// Context for a client production build rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root_directory: root.into(),
            custom_app_file: None,
            is_development: false,
            is_production: true,
            is_server: false,
            is_client: true,
            asset_prefix: String::new(),
        }
    }

    pub fn development(mut self, dev: bool) -> Self {
        self.is_development = dev;
        self.is_production = !dev;
        self
    }

    pub fn server(mut self, is_server: bool) -> Self {
        self.is_server = is_server;
        self.is_client = !is_server;
        self
    }

    pub fn custom_app_file(mut self, path: Option<PathBuf>) -> Self {
        self.custom_app_file = path;
        self
    }

    pub fn asset_prefix(mut self, prefix: Option<&str>) -> Self {
        self.asset_prefix = normalize_asset_prefix(prefix);
        self
    }

    /// The custom app file relative to the root, as shown in messages.
    pub fn custom_app_display(&self) -> String {
        match &self.custom_app_file {
            Some(file) => file
                .strip_prefix(&self.root_directory)
                .unwrap_or(file)
                .display()
                .to_string(),
            None => "pages/_app.js".to_string(),
        }
    }
}

/// Strip one trailing `/` from an asset prefix; absent becomes empty.
pub fn normalize_asset_prefix(prefix: Option<&str>) -> String {
    match prefix {
        Some(prefix) => prefix.strip_suffix('/').unwrap_or(prefix).to_string(),
        None => String::new(),
    }
}

/// State shared by the server and client invocations of one build.
pub struct BuildSession {
    reporter: Arc<dyn Reporter>,
    registry: PluginRegistry,
    missing_pre_processors_reported: AtomicBool,
}

impl BuildSession {
    pub fn new() -> Self {
        Self::with_reporter(Arc::new(TerminalReporter))
    }

    pub fn with_reporter(reporter: Arc<dyn Reporter>) -> Self {
        Self {
            reporter,
            registry: PluginRegistry::default(),
            missing_pre_processors_reported: AtomicBool::new(false),
        }
    }

    pub fn registry(mut self, registry: PluginRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn plugin_registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn report(&self, message: Message) {
        self.reporter.report(&message);
    }

    /// Report the missing-`preProcessors` warning unless this build already did.
    pub(crate) fn report_missing_pre_processors(&self, message: Message) {
        if !self
            .missing_pre_processors_reported
            .swap(true, Ordering::SeqCst)
        {
            self.report(message);
        }
    }
}

impl Default for BuildSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BuildSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildSession")
            .field("registry", &self.registry)
            .field(
                "missing_pre_processors_reported",
                &self.missing_pre_processors_reported.load(Ordering::SeqCst),
            )
            .finish_non_exhaustive()
    }
}
