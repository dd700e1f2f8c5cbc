//! Declarative bundler configuration.
//!
//! This is the subset of a webpack-style configuration object that CSS rule
//! construction touches: the module rule list, the optimizer's minimizer list
//! and the plugin list. Rules are appended, never reordered or removed.
//!
//! [`BuildConfiguration::resolve`] evaluates the rule list for one request with
//! the bundler's semantics (every top-level rule is tried, `one_of` groups stop
//! at their first matching child), which makes the effect of rule ordering
//! observable without running a bundler.

mod condition;
mod rule;

use std::path::Path;

use serde::Serialize;

pub use condition::Condition;
pub use rule::{Rule, RuleAction, UseItem};

/// The bundler configuration for one build target.
///
/// Only appended to: host rules, plugins and minimizers already present are
/// left in place and in order.
///
/// # Example
///
/// ```
/// use fob_css_rules::{BuildConfiguration, Condition, Rule, UseItem};
///
/// let mut config = BuildConfiguration::new();
/// config.add_rule(
///     Rule::new()
///         .test(Condition::regex(r"\.svg$").unwrap())
///         .uses(vec![UseItem::new("svgr-loader")]),
/// );
/// assert_eq!(config.module.rules.len(), 1);
/// assert!(config.css_rule_group().is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildConfiguration {
    pub module: ModuleOptions,
    pub optimization: Optimization,
    pub plugins: Vec<BundlerPlugin>,
}

/// `module` section: the ordered rule list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModuleOptions {
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Optimization {
    /// `None` leaves the bundler's default minimizers in place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimizer: Option<Vec<Minimizer>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Minimizer {
    /// CSS minifier for extracted stylesheets.
    Css,
    /// Any minimizer the host registered.
    Named(String),
}

/// A plugin registered with the bundler.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BundlerPlugin {
    ExtractCss(ExtractCssOptions),
}

/// Options for the plugin that pulls CSS into standalone, content-hashed files.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractCssOptions {
    pub filename: String,
    pub chunk_filename: String,
    pub ignore_order: bool,
}

impl BuildConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration whose optimizer already has a minimizer list, as hosts
    /// running production builds do.
    pub fn with_minimizers(minimizers: impl IntoIterator<Item = Minimizer>) -> Self {
        Self {
            optimization: Optimization {
                minimizer: Some(minimizers.into_iter().collect()),
            },
            ..Self::default()
        }
    }

    /// Append a rule. A `one_of` group is merged into the group previously
    /// created by this crate, when there is one.
    pub fn add_rule(&mut self, rule: Rule) -> &mut Self {
        if !rule.one_of.is_empty() {
            if let Some(existing) = self
                .module
                .rules
                .iter_mut()
                .find(|existing| existing.is_css_rule_group())
            {
                existing.one_of.extend(rule.one_of);
                return self;
            }
        }

        self.module.rules.push(rule);
        self
    }

    pub fn add_plugin(&mut self, plugin: BundlerPlugin) -> &mut Self {
        self.plugins.push(plugin);
        self
    }

    /// Append a minimizer when the host declared a minimizer list.
    pub fn add_minimizer(&mut self, minimizer: Minimizer) -> &mut Self {
        if let Some(list) = self.optimization.minimizer.as_mut() {
            list.push(minimizer);
        }
        self
    }

    /// The group created by [`configure_css`](crate::configure_css), if any.
    pub fn css_rule_group(&self) -> Option<&Rule> {
        self.module.rules.iter().find(|rule| rule.is_css_rule_group())
    }

    /// Acting rules for `resource` imported by `issuer`, in evaluation order.
    pub fn resolve(&self, resource: &Path, issuer: Option<&Path>) -> Vec<&Rule> {
        let mut out = Vec::new();
        for rule in &self.module.rules {
            rule.resolve(resource, issuer, &mut out);
        }
        out
    }
}
