//! PostCSS plugin set resolution.
//!
//! The project's PostCSS configuration (or the built-in default set) is turned
//! into an ordered list of [`PostCssPlugin`] descriptors that `postcss-loader`
//! receives. Misconfigurations are reported through the session before the
//! build is halted.

mod browserslist;
mod registry;

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::context::BuildSession;
use crate::discovery::{ConfigValue, find_config};
use crate::error::{Error, Result};
use crate::messages::Message;

pub use browserslist::{DEFAULT_QUERIES, browsers_or_default};
pub use registry::{
    BUNDLED_PLUGINS, BundledPlugins, NodeModulesResolver, PluginRegistry, PluginResolver,
    PluginSource,
};

const SHAPE_LINK: &str = "https://err.sh/next.js/postcss-shape";
const FUNCTION_LINK: &str = "https://err.sh/next.js/postcss-function";
const IGNORED_PLUGIN_LINK: &str = "https://err.sh/next.js/postcss-ignored-plugin";

/// Plugins this crate configures itself as part of CSS modules support.
const IGNORED_PLUGINS: &str = r"(?i)(?:^|[\\/])(postcss-modules-values|postcss-modules-scope|postcss-modules-extract-imports|postcss-modules-local-by-default|postcss-modules)(?:[\\/]|$)";

/// A resolved PostCSS plugin, as handed to `postcss-loader`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostCssPlugin {
    pub name: String,
    /// Install location; `None` for bundled plugins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

/// Resolve the PostCSS plugins for the project at `root`.
///
/// Without a PostCSS configuration the result is `postcss-flexbugs-fixes`
/// followed by `postcss-preset-env` targeting the project's browserslist.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use fob_css_rules::{BuildSession, load_postcss_plugins};
///
/// let session = BuildSession::new();
/// let plugins = load_postcss_plugins(Path::new("."), true, &session).unwrap();
/// for plugin in &plugins {
///     println!("{}", plugin.name);
/// }
/// ```
pub fn load_postcss_plugins(
    root: &Path,
    is_production: bool,
    session: &BuildSession,
) -> Result<Vec<PostCssPlugin>> {
    let config = match find_config(root, "postcss")? {
        Some(found) => match found.value {
            ConfigValue::Function => {
                return Err(fatal(
                    session,
                    Message::error(
                        "Your custom PostCSS configuration may not export a function. Please export a plain object instead.",
                    )
                    .with_help_link(FUNCTION_LINK),
                ));
            }
            ConfigValue::Data(value) => value,
        },
        None => default_config(root, is_production),
    };

    let empty = Map::new();
    let fields = config.as_object().unwrap_or(&empty);

    if let Some(key) = fields.keys().find(|key| key.as_str() != "plugins") {
        session.report(Message::warning(format!(
            "Your PostCSS configuration defines a field which is not supported (`{key}`). Please remove this configuration value."
        )));
    }

    let pairs: Vec<(String, Value)> = match fields.get("plugins") {
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Some(Value::Array(entries)) => parse_plugin_array(entries, session)?,
        _ => {
            return Err(fatal(
                session,
                Message::error("Your custom PostCSS configuration must export a `plugins` key."),
            ));
        }
    };

    let ignored = IgnoredPlugins::new()?;
    let mut plugins = Vec::with_capacity(pairs.len());
    for (name, settings) in pairs {
        if let Some(plugin) = load_plugin(root, &name, settings, &ignored, session)? {
            plugins.push(plugin);
        }
    }

    tracing::debug!(
        count = plugins.len(),
        names = ?plugins.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        "resolved PostCSS plugins"
    );
    Ok(plugins)
}

/// `postcss-flexbugs-fixes` and `postcss-preset-env` targeting the project's browsers.
fn default_config(root: &Path, is_production: bool) -> Value {
    let env = if is_production { "production" } else { "development" };
    let browsers = browsers_or_default(root, env);

    json!({
        "plugins": [
            "postcss-flexbugs-fixes",
            [
                "postcss-preset-env",
                {
                    "browsers": browsers,
                    "autoprefixer": { "flexbox": "no-2009" },
                    "stage": 3,
                    "features": { "custom-properties": false }
                }
            ]
        ]
    })
}

fn parse_plugin_array(entries: &[Value], session: &BuildSession) -> Result<Vec<(String, Value)>> {
    let mut pairs = Vec::with_capacity(entries.len());

    for entry in entries {
        match entry {
            Value::Null => {
                session.report(Message::warning(
                    "A null or undefined PostCSS plugin was provided. This entry will be ignored.",
                ));
            }
            Value::String(name) => pairs.push((name.clone(), Value::Bool(true))),
            Value::Array(shape) => {
                let settings = shape
                    .get(1)
                    .filter(|s| matches!(s, Value::Bool(_) | Value::Object(_) | Value::Array(_) | Value::Null));
                match (shape.first(), settings) {
                    (Some(Value::String(name)), Some(settings)) => {
                        pairs.push((name.clone(), settings.clone()));
                    }
                    (Some(Value::String(name)), None) => {
                        return Err(fatal(
                            session,
                            Message::error(format!(
                                "A PostCSS Plugin was passed as an array but did not provide its configuration ('{name}')."
                            ))
                            .with_help_link(SHAPE_LINK),
                        ));
                    }
                    (name, _) => {
                        return Err(fatal(
                            session,
                            Message::error(format!(
                                "A PostCSS plugin must be provided as a 'string'. Instead, we got: '{}'.",
                                display_value(name.unwrap_or(&Value::Null))
                            ))
                            .with_help_link(SHAPE_LINK),
                        ));
                    }
                }
            }
            other => {
                return Err(fatal(
                    session,
                    Message::error(format!(
                        "An unknown PostCSS plugin was provided ({}).",
                        display_value(other)
                    ))
                    .with_help_link(SHAPE_LINK),
                ));
            }
        }
    }

    Ok(pairs)
}

fn load_plugin(
    root: &Path,
    name: &str,
    settings: Value,
    ignored: &IgnoredPlugins,
    session: &BuildSession,
) -> Result<Option<PostCssPlugin>> {
    if settings == Value::Bool(false) {
        tracing::trace!(name, "PostCSS plugin disabled");
        return Ok(None);
    }
    if ignored.check(name, session) {
        return Ok(None);
    }
    if settings.is_null() {
        return Err(fatal(
            session,
            Message::error(format!(
                "Your PostCSS configuration for '{name}' cannot have null or undefined configuration.\nTo disable '{name}', pass false, otherwise, pass true or a configuration object."
            )),
        ));
    }

    let Some(source) = session.plugin_registry().resolve(name, root) else {
        let error = Error::PluginNotFound {
            name: name.to_string(),
            root: root.to_path_buf(),
        };
        session.report(Message::error(format!(
            "The PostCSS plugin '{name}' could not be found. Install it, or remove it from your PostCSS configuration."
        )));
        return Err(error);
    };

    if let Some(path) = source.path() {
        if ignored.check(&path.to_string_lossy(), session) {
            return Ok(None);
        }
    }

    let options = match settings {
        Value::Bool(true) => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(other),
    };

    Ok(Some(PostCssPlugin {
        name: name.to_string(),
        path: source.path().map(Path::to_path_buf),
        options,
    }))
}

struct IgnoredPlugins(Regex);

impl IgnoredPlugins {
    fn new() -> Result<Self> {
        Ok(Self(Regex::new(IGNORED_PLUGINS)?))
    }

    /// Warn and return `true` when `name_or_path` refers to a reserved plugin.
    fn check(&self, name_or_path: &str, session: &BuildSession) -> bool {
        let Some(plugin) = self.0.captures(name_or_path).and_then(|c| c.get(1)) else {
            return false;
        };

        session.report(
            Message::warning(format!(
                "Please remove the {} plugin from your PostCSS configuration. This plugin is automatically configured by fob-css-rules.",
                plugin.as_str()
            ))
            .with_help_link(IGNORED_PLUGIN_LINK),
        );
        true
    }
}

/// Report `message` and turn it into the build-halting error.
fn fatal(session: &BuildSession, message: Message) -> Error {
    let error = Error::malformed_postcss(message.body.clone(), message.help_link.as_deref());
    session.report(message);
    error
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "undefined".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{MemoryReporter, MessageLevel};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn session() -> (Arc<MemoryReporter>, BuildSession) {
        let reporter = Arc::new(MemoryReporter::new());
        let session = BuildSession::with_reporter(reporter.clone()).registry(
            PluginRegistry::default()
                .with_resolver(BundledPlugins::new(["tailwindcss", "autoprefixer", "postcss-modules"])),
        );
        (reporter, session)
    }

    fn write_config(dir: &TempDir, body: &str) {
        fs::write(dir.path().join(".postcssrc.json"), body).unwrap();
    }

    #[test]
    fn defaults_without_configuration() {
        let dir = TempDir::new().unwrap();
        let (reporter, session) = session();

        let plugins = load_postcss_plugins(dir.path(), true, &session).unwrap();

        assert_eq!(plugins.len(), 2);
        assert_eq!(plugins[0].name, "postcss-flexbugs-fixes");
        assert_eq!(plugins[0].options, None);
        assert_eq!(plugins[1].name, "postcss-preset-env");
        let options = plugins[1].options.as_ref().unwrap();
        assert_eq!(options["stage"], json!(3));
        assert_eq!(options["autoprefixer"]["flexbox"], json!("no-2009"));
        assert_eq!(options["features"]["custom-properties"], json!(false));
        assert!(options["browsers"].is_array());
        assert!(reporter.messages().is_empty());
    }

    #[test]
    fn defaults_use_project_browsers() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".browserslistrc"),
            "[production]\nchrome 100\n[development]\nlast 1 chrome version\n",
        )
        .unwrap();
        let (_, session) = session();

        let plugins = load_postcss_plugins(dir.path(), false, &session).unwrap();
        let browsers = &plugins[1].options.as_ref().unwrap()["browsers"];
        // BROWSERSLIST in the environment takes precedence over files
        if std::env::var("BROWSERSLIST").is_err() {
            assert_eq!(browsers, &json!(["last 1 chrome version"]));
        }
    }

    #[test]
    fn map_form_keeps_order_and_options() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            r#"{ "plugins": { "tailwindcss": {}, "autoprefixer": { "grid": true }, "postcss-preset-env": false } }"#,
        );
        let (_, session) = session();

        let plugins = load_postcss_plugins(dir.path(), true, &session).unwrap();

        assert_eq!(plugins.len(), 2);
        assert_eq!(plugins[0].name, "tailwindcss");
        assert_eq!(plugins[0].options, None);
        assert_eq!(plugins[1].name, "autoprefixer");
        assert_eq!(plugins[1].options, Some(json!({ "grid": true })));
    }

    #[test]
    fn array_form_with_null_entry_warns() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, r#"{ "plugins": [null, "tailwindcss", ["autoprefixer", true]] }"#);
        let (reporter, session) = session();

        let plugins = load_postcss_plugins(dir.path(), true, &session).unwrap();

        assert_eq!(plugins.len(), 2);
        assert_eq!(reporter.count(MessageLevel::Warning), 1);
        assert!(reporter.messages()[0].body.contains("will be ignored"));
    }

    #[test]
    fn unsupported_key_warns() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, r#"{ "map": true, "plugins": [] }"#);
        let (reporter, session) = session();

        load_postcss_plugins(dir.path(), true, &session).unwrap();

        assert_eq!(reporter.count(MessageLevel::Warning), 1);
        assert!(reporter.messages()[0].body.contains("(`map`)"));
    }

    #[test]
    fn missing_plugins_key_is_fatal() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, r#"{ "plugins": "tailwindcss" }"#);
        let (reporter, session) = session();

        let err = load_postcss_plugins(dir.path(), true, &session).unwrap_err();

        assert!(matches!(err, Error::MalformedPostCssConfiguration { .. }));
        assert_eq!(reporter.count(MessageLevel::Error), 1);
        assert!(reporter.messages()[0].body.contains("must export a `plugins` key"));
    }

    #[test]
    fn function_export_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("postcss.config.js"),
            "module.exports = function (ctx) { return { plugins: [] } }",
        )
        .unwrap();
        let (reporter, session) = session();

        let err = load_postcss_plugins(dir.path(), true, &session).unwrap_err();

        assert!(err.to_string().contains("may not export a function"));
        assert_eq!(
            reporter.messages()[0].help_link.as_deref(),
            Some(FUNCTION_LINK)
        );
    }

    #[test]
    fn shape_errors() {
        let cases = [
            (r#"{ "plugins": [[42, {}]] }"#, "must be provided as a 'string'. Instead, we got: '42'"),
            (r#"{ "plugins": [["tailwindcss"]] }"#, "did not provide its configuration ('tailwindcss')"),
            (r#"{ "plugins": [["tailwindcss", 1]] }"#, "did not provide its configuration"),
            (r#"{ "plugins": [7] }"#, "An unknown PostCSS plugin was provided (7)."),
        ];

        for (config, expected) in cases {
            let dir = TempDir::new().unwrap();
            write_config(&dir, config);
            let (reporter, session) = session();

            let err = load_postcss_plugins(dir.path(), true, &session).unwrap_err();

            assert!(err.to_string().contains(expected), "{config}: {err}");
            assert_eq!(reporter.messages()[0].help_link.as_deref(), Some(SHAPE_LINK));
        }
    }

    #[test]
    fn null_settings_are_fatal() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, r#"{ "plugins": { "tailwindcss": null } }"#);
        let (reporter, session) = session();

        let err = load_postcss_plugins(dir.path(), true, &session).unwrap_err();

        assert!(err.to_string().contains("cannot have null or undefined configuration"));
        assert!(reporter.messages()[0].body.contains("To disable 'tailwindcss', pass false"));
    }

    #[test]
    fn reserved_plugin_names_are_skipped() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, r#"{ "plugins": ["postcss-modules", "tailwindcss", ["POSTCSS-MODULES-SCOPE", {}]] }"#);
        let (reporter, session) = session();

        let plugins = load_postcss_plugins(dir.path(), true, &session).unwrap();

        assert_eq!(plugins.len(), 1);
        assert_eq!(reporter.count(MessageLevel::Warning), 2);
        assert!(reporter.messages()[0].body.contains("remove the postcss-modules plugin"));
        assert!(reporter.messages()[1].body.contains("POSTCSS-MODULES-SCOPE"));
    }

    #[test]
    fn reserved_plugin_resolved_path_is_skipped() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, r#"{ "plugins": ["modules-alias"] }"#);
        fs::create_dir_all(dir.path().join("node_modules").join("postcss-modules-values")).unwrap();

        #[derive(Debug)]
        struct Alias(PathBuf);
        impl PluginResolver for Alias {
            fn resolve(&self, _name: &str, _root: &Path) -> Option<PluginSource> {
                Some(PluginSource::Path(self.0.clone()))
            }
        }

        let reporter = Arc::new(MemoryReporter::new());
        let session = BuildSession::with_reporter(reporter.clone()).registry(
            PluginRegistry::empty().with_resolver(Alias(
                dir.path().join("node_modules").join("postcss-modules-values"),
            )),
        );

        let plugins = load_postcss_plugins(dir.path(), true, &session).unwrap();

        assert!(plugins.is_empty());
        assert!(reporter.messages()[0].body.contains("postcss-modules-values"));
    }

    #[test]
    fn unresolvable_plugin_is_fatal() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, r#"{ "plugins": ["postcss-does-not-exist"] }"#);
        let (reporter, session) = session();

        let err = load_postcss_plugins(dir.path(), true, &session).unwrap_err();

        assert!(matches!(err, Error::PluginNotFound { ref name, .. } if name == "postcss-does-not-exist"));
        assert_eq!(reporter.count(MessageLevel::Error), 1);
    }

    #[test]
    fn node_modules_plugins_carry_their_path() {
        let dir = TempDir::new().unwrap();
        let installed = dir.path().join("node_modules").join("postcss-nested");
        fs::create_dir_all(&installed).unwrap();
        write_config(&dir, r#"{ "plugins": { "postcss-nested": { "bubble": ["screen"] } } }"#);
        let (_, session) = session();

        let plugins = load_postcss_plugins(dir.path(), true, &session).unwrap();

        assert_eq!(plugins[0].path.as_deref(), Some(installed.as_path()));
        assert_eq!(plugins[0].options, Some(json!({ "bubble": ["screen"] })));
    }
}
