//! Browserslist query lookup.
//!
//! Queries come from, in order: the `BROWSERSLIST` environment variable, a file
//! named by `BROWSERSLIST_CONFIG`, or the nearest directory holding a
//! `package.json` with a `browserslist` key, a `browserslist` file or a
//! `.browserslistrc` file. Configs may split queries into `[env]` sections.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, Result};

/// Used when no configuration exists or it cannot be read.
pub const DEFAULT_QUERIES: [&str; 1] = ["defaults"];

const DEFAULTS_SECTION: &str = "defaults";

/// Queries for `env` (`production` or `development`), falling back to
/// [`DEFAULT_QUERIES`] on absence or any failure.
pub fn browsers_or_default(root: &Path, env: &str) -> Vec<String> {
    let overrides = EnvOverrides::from_process();
    match load_config(root, env, &overrides) {
        Ok(Some(queries)) => queries,
        Ok(None) => default_queries(),
        Err(error) => {
            tracing::debug!(%error, "ignoring unreadable browserslist configuration");
            default_queries()
        }
    }
}

fn default_queries() -> Vec<String> {
    DEFAULT_QUERIES.iter().map(|q| q.to_string()).collect()
}

#[derive(Debug, Default, Clone)]
pub(crate) struct EnvOverrides {
    queries: Option<String>,
    config: Option<PathBuf>,
}

impl EnvOverrides {
    fn from_process() -> Self {
        Self {
            queries: std::env::var("BROWSERSLIST").ok().filter(|v| !v.is_empty()),
            config: std::env::var_os("BROWSERSLIST_CONFIG").map(PathBuf::from),
        }
    }
}

/// Look up the queries for `env`, `None` when nothing is configured.
pub(crate) fn load_config(
    root: &Path,
    env: &str,
    overrides: &EnvOverrides,
) -> Result<Option<Vec<String>>> {
    if let Some(queries) = &overrides.queries {
        return Ok(Some(split_queries(queries)));
    }

    let sections = match &overrides.config {
        Some(path) => Some(read_config_file(path)?),
        None => find_sections(root)?,
    };

    Ok(sections.and_then(|sections| pick_env(sections, env)))
}

type Sections = BTreeMap<String, Vec<String>>;

fn find_sections(root: &Path) -> Result<Option<Sections>> {
    for dir in root.ancestors() {
        let mut found: Vec<(PathBuf, Sections)> = Vec::new();

        let manifest = dir.join("package.json");
        if manifest.is_file() {
            if let Some(sections) = read_package_json(&manifest)? {
                found.push((manifest, sections));
            }
        }
        for name in ["browserslist", ".browserslistrc"] {
            let path = dir.join(name);
            if path.is_file() {
                let sections = read_config_file(&path)?;
                found.push((path, sections));
            }
        }

        match found.len() {
            0 => continue,
            1 => {
                let (path, sections) = found.remove(0);
                tracing::debug!(path = %path.display(), "found browserslist configuration");
                return Ok(Some(sections));
            }
            _ => {
                let names: Vec<String> = found
                    .iter()
                    .map(|(path, _)| path.display().to_string())
                    .collect();
                return Err(Error::config_parse(
                    dir,
                    format!("conflicting browserslist configurations: {}", names.join(", ")),
                ));
            }
        }
    }
    Ok(None)
}

fn read_package_json(path: &Path) -> Result<Option<Sections>> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let manifest: Value = serde_json::from_str(&content).map_err(|e| Error::config_parse(path, e))?;

    let sections = match manifest.get("browserslist") {
        None => return Ok(None),
        Some(Value::String(query)) => single_section(split_queries(query)),
        Some(Value::Array(queries)) => single_section(string_list(path, queries)?),
        Some(Value::Object(envs)) => {
            let mut sections = Sections::new();
            for (env, queries) in envs {
                let queries = match queries {
                    Value::String(query) => split_queries(query),
                    Value::Array(queries) => string_list(path, queries)?,
                    other => {
                        return Err(Error::config_parse(
                            path,
                            format!("browserslist.{env} must be a string or an array, got {other}"),
                        ));
                    }
                };
                sections.insert(env.clone(), queries);
            }
            sections
        }
        Some(other) => {
            return Err(Error::config_parse(
                path,
                format!("browserslist must be a string, an array or an object, got {other}"),
            ));
        }
    };
    Ok(Some(sections))
}

fn string_list(path: &Path, values: &[Value]) -> Result<Vec<String>> {
    values
        .iter()
        .map(|value| {
            value.as_str().map(str::to_string).ok_or_else(|| {
                Error::config_parse(path, format!("browserslist query must be a string, got {value}"))
            })
        })
        .collect()
}

fn single_section(queries: Vec<String>) -> Sections {
    Sections::from([(DEFAULTS_SECTION.to_string(), queries)])
}

fn read_config_file(path: &Path) -> Result<Sections> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_config(path, &content)
}

/// Parse the line-based browserslist format.
fn parse_config(path: &Path, content: &str) -> Result<Sections> {
    let mut sections = single_section(Vec::new());
    let mut current = vec![DEFAULTS_SECTION.to_string()];

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            current = header.split_whitespace().map(str::to_string).collect();
            for name in &current {
                if sections.contains_key(name) && name != DEFAULTS_SECTION {
                    return Err(Error::config_parse(
                        path,
                        format!("duplicate browserslist section `{name}`"),
                    ));
                }
                sections.entry(name.clone()).or_default();
            }
            continue;
        }

        for name in &current {
            sections
                .entry(name.clone())
                .or_default()
                .extend(split_queries(line));
        }
    }
    Ok(sections)
}

fn split_queries(queries: &str) -> Vec<String> {
    queries
        .split(',')
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect()
}

fn pick_env(mut sections: Sections, env: &str) -> Option<Vec<String>> {
    let queries = sections
        .remove(env)
        .or_else(|| sections.remove(DEFAULTS_SECTION))?;
    (!queries.is_empty()).then_some(queries)
}
