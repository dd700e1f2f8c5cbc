use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Serialize, Serializer};

/// A rule condition, evaluated against a module path.
///
/// Mirrors the condition forms a webpack-style rule accepts: a regular
/// expression, an absolute path prefix (compared as a string, so `/app` also
/// accepts `/app-shared/x.js`), a list (any entry may match) and an
/// `{ and, not }` object (every `and` entry matches, no `not` entry matches).
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use fob_css_rules::Condition;
///
/// let global = Condition::regex(r"\.css$")
///     .unwrap()
///     .and_not([Condition::regex(r"\.module\.css$").unwrap()]);
///
/// assert!(global.matches(Path::new("/app/styles/global.css")));
/// assert!(!global.matches(Path::new("/app/components/button.module.css")));
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Condition {
    Regex(#[serde(serialize_with = "serialize_regex")] Regex),
    Path(PathBuf),
    Any(Vec<Condition>),
    All {
        and: Vec<Condition>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        not: Vec<Condition>,
    },
}

impl Condition {
    /// Compile a regular expression condition.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Condition::Regex)
    }

    /// Match inputs starting with `path`. An empty path never matches.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Condition::Path(path.into())
    }

    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Condition::Any(conditions.into_iter().collect())
    }

    pub fn all(and: impl IntoIterator<Item = Condition>) -> Self {
        Condition::All {
            and: and.into_iter().collect(),
            not: Vec::new(),
        }
    }

    /// Require that none of `not` matches, in addition to `self`.
    pub fn and_not(self, not: impl IntoIterator<Item = Condition>) -> Self {
        match self {
            Condition::All { and, not: mut existing } => {
                existing.extend(not);
                Condition::All { and, not: existing }
            }
            other => Condition::All {
                and: vec![other],
                not: not.into_iter().collect(),
            },
        }
    }

    pub fn matches(&self, input: &Path) -> bool {
        match self {
            Condition::Regex(re) => re.is_match(&input.to_string_lossy()),
            Condition::Path(prefix) => {
                let prefix = prefix.to_string_lossy();
                !prefix.is_empty() && input.to_string_lossy().starts_with(&*prefix)
            }
            Condition::Any(conditions) => conditions.iter().any(|c| c.matches(input)),
            Condition::All { and, not } => {
                and.iter().all(|c| c.matches(input)) && !not.iter().any(|c| c.matches(input))
            }
        }
    }
}

fn serialize_regex<S: Serializer>(re: &Regex, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("/{}/", re.as_str()))
}
