//! Upward search for tool configuration files.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, Result};

/// Contents of a discovered configuration file.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// The parsed configuration object.
    Data(Value),
    /// A JS config that exports a function rather than a plain object.
    Function,
}

/// A configuration located by [`find_config`].
#[derive(Debug, Clone, PartialEq)]
pub struct FoundConfig {
    /// The file the configuration was read from; `package.json` for a manifest field.
    pub path: PathBuf,
    pub value: ConfigValue,
}

/// Find the first of `names` in `start` or its ancestors.
///
/// Every name is checked in a directory before moving to its parent.
pub fn find_up<S: AsRef<str>>(start: &Path, names: &[S]) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        names
            .iter()
            .map(|name| dir.join(name.as_ref()))
            .find(|candidate| candidate.is_file())
    })
}

/// Candidate filenames for `key`, in priority order.
pub fn config_file_names(key: &str) -> [String; 4] {
    [
        format!(".{key}rc.json"),
        format!("{key}.config.json"),
        format!(".{key}rc.js"),
        format!("{key}.config.js"),
    ]
}

/// Locate configuration for `key` starting at `directory`.
///
/// The nearest `package.json` wins when its `key` field is an object. Otherwise
/// the conventional filenames are searched upward. JSON files may contain
/// comments and trailing commas. JS files are read statically: the object
/// literal they export is parsed as JSON5.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use fob_css_rules::{ConfigValue, find_config};
///
/// if let Some(found) = find_config(Path::new("."), "postcss").unwrap() {
///     match found.value {
///         ConfigValue::Data(value) => println!("{}: {value}", found.path.display()),
///         ConfigValue::Function => eprintln!("{} exports a function", found.path.display()),
///     }
/// }
/// ```
pub fn find_config(directory: &Path, key: &str) -> Result<Option<FoundConfig>> {
    if let Some(package_json) = find_up(directory, &["package.json"]) {
        let manifest = read_json(&package_json)?;
        if let Some(field) = manifest.get(key).filter(|v| v.is_object() || v.is_array()) {
            tracing::debug!(path = %package_json.display(), key, "found configuration in package.json");
            return Ok(Some(FoundConfig {
                path: package_json,
                value: ConfigValue::Data(field.clone()),
            }));
        }
    }

    let Some(path) = find_up(directory, &config_file_names(key)) else {
        return Ok(None);
    };

    let source = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    let value = if path.extension().is_some_and(|ext| ext == "js") {
        evaluate_js_config(&path, &source)?
    } else {
        ConfigValue::Data(json5::from_str(&source).map_err(|e| Error::config_parse(&path, e))?)
    };

    tracing::debug!(path = %path.display(), key, "found configuration file");
    Ok(Some(FoundConfig { path, value }))
}

fn read_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| Error::config_parse(path, e))
}

/// Read the value exported by a CommonJS or ESM config module without running it.
fn evaluate_js_config(path: &Path, source: &str) -> Result<ConfigValue> {
    let source = strip_comments(source);
    let exported = find_export(&source)
        .ok_or_else(|| Error::config_parse(path, "no `module.exports` or `export default` found"))?;

    let exported = exported.trim_start();
    let exported = exported.strip_prefix('=').unwrap_or(exported);
    let exported = exported.trim().trim_end_matches(';').trim_end();

    if exports_function(exported) {
        return Ok(ConfigValue::Function);
    }

    json5::from_str(exported)
        .map(ConfigValue::Data)
        .map_err(|e| {
            Error::config_parse(
                path,
                format!("the exported value must be a plain object literal ({e})"),
            )
        })
}

/// Text following the first `module.exports` or `export default` that starts a statement.
fn find_export(source: &str) -> Option<&str> {
    ["module.exports", "export default"].iter().find_map(|marker| {
        source
            .match_indices(marker)
            .find(|(at, _)| starts_statement(&source[..*at]))
            .map(|(at, _)| &source[at + marker.len()..])
    })
}

fn starts_statement(before: &str) -> bool {
    let line = before.rsplit('\n').next().unwrap_or_default().trim_end();
    line.is_empty() || line.ends_with(';') || line.ends_with('}')
}

/// Blank out `//` and `/* */` comments. String literals are kept as written.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        let next = chars.peek().copied();
        match (c, next) {
            ('/', Some('/')) => {
                while chars.next_if(|&n| n != '\n').is_some() {}
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for n in chars.by_ref() {
                    if previous == '*' && n == '/' {
                        break;
                    }
                    if n == '\n' {
                        out.push('\n');
                    }
                    previous = n;
                }
                out.push(' ');
            }
            ('"' | '\'' | '`', _) => {
                quote = Some(c);
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}

fn exports_function(expr: &str) -> bool {
    if expr.starts_with("function") || expr.starts_with("async") {
        return true;
    }
    match (expr.find("=>"), expr.find('{')) {
        (Some(arrow), Some(brace)) => arrow < brace,
        (Some(_), None) => true,
        _ => false,
    }
}
