use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::condition::Condition;
use crate::messages::Message;

/// One step of a transform chain: a named loader and its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "UseItemRepr")]
pub struct UseItem {
    pub loader: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl UseItem {
    pub fn new(loader: impl Into<String>) -> Self {
        Self {
            loader: loader.into(),
            options: None,
        }
    }

    pub fn with_options(loader: impl Into<String>, options: Value) -> Self {
        Self {
            loader: loader.into(),
            options: Some(options),
        }
    }
}

/// Loaders are written either as a bare name or as `{ loader, options }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum UseItemRepr {
    Name(String),
    Full {
        loader: String,
        #[serde(default)]
        options: Option<Value>,
    },
}

impl From<UseItemRepr> for UseItem {
    fn from(repr: UseItemRepr) -> Self {
        match repr {
            UseItemRepr::Name(loader) => UseItem::new(loader),
            UseItemRepr::Full { loader, options } => UseItem { loader, options },
        }
    }
}

/// What happens to a module once a rule has matched it.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    /// A pure grouping rule; only its `one_of` children act.
    #[default]
    None,
    /// Marker identifying the rule group owned by this crate. Never matches.
    Sentinel,
    /// The bundler fails the build with this message.
    Error(Message),
    /// The module is processed by this transform chain.
    Use(Vec<UseItem>),
}

impl RuleAction {
    pub fn is_none(&self) -> bool {
        matches!(self, RuleAction::None)
    }
}

/// One entry of the bundler's rule list.
///
/// A rule acts when all of its conditions accept the request. `one_of`
/// children are tried in order and only the first one that matches acts.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use fob_css_rules::{BuildConfiguration, Condition, Rule, RuleAction, UseItem};
///
/// let mut config = BuildConfiguration::new();
/// config.add_rule(Rule::one_of([
///     Rule::new()
///         .test(Condition::regex(r"\.module\.css$").unwrap())
///         .uses(vec![UseItem::new("css-loader")]),
///     Rule::new()
///         .test(Condition::regex(r"\.css$").unwrap())
///         .uses(vec![UseItem::new("style-loader")]),
/// ]));
///
/// let acting = config.resolve(Path::new("/app/button.module.css"), None);
/// assert_eq!(acting.len(), 1);
/// assert!(matches!(&acting[0].action, RuleAction::Use(items) if items[0].loader == "css-loader"));
/// ```
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_effects: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Rule>,
    #[serde(skip_serializing_if = "RuleAction::is_none")]
    pub action: RuleAction,
}

impl Rule {
    pub fn new() -> Self {
        Self::default()
    }

    /// A grouping rule whose children are tried in order, first match wins.
    pub fn one_of(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            one_of: rules.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn test(mut self, condition: Condition) -> Self {
        self.test = Some(condition);
        self
    }

    pub fn include(mut self, condition: Condition) -> Self {
        self.include = Some(condition);
        self
    }

    pub fn exclude(mut self, condition: Condition) -> Self {
        self.exclude = Some(condition);
        self
    }

    pub fn issuer(mut self, condition: Condition) -> Self {
        self.issuer = Some(condition);
        self
    }

    pub fn side_effects(mut self, side_effects: bool) -> Self {
        self.side_effects = Some(side_effects);
        self
    }

    pub fn action(mut self, action: RuleAction) -> Self {
        self.action = action;
        self
    }

    pub fn uses(self, items: Vec<UseItem>) -> Self {
        self.action(RuleAction::Use(items))
    }

    pub fn error(self, message: Message) -> Self {
        self.action(RuleAction::Error(message))
    }

    /// Whether this is the group created by [`configure_css`](crate::configure_css).
    pub fn is_css_rule_group(&self) -> bool {
        self.one_of
            .first()
            .is_some_and(|first| matches!(first.action, RuleAction::Sentinel))
    }

    /// Whether this rule's own conditions accept the request.
    ///
    /// `test`, `include` and `exclude` look at the resource; `issuer` looks at
    /// the importing module, which is the empty path for entry points.
    pub fn matches(&self, resource: &Path, issuer: Option<&Path>) -> bool {
        let issuer = issuer.unwrap_or(Path::new(""));
        self.test.as_ref().is_none_or(|c| c.matches(resource))
            && self.include.as_ref().is_none_or(|c| c.matches(resource))
            && !self.exclude.as_ref().is_some_and(|c| c.matches(resource))
            && self.issuer.as_ref().is_none_or(|c| c.matches(issuer))
    }

    /// Collect the acting rules for a request, descending into `one_of` groups.
    pub(crate) fn resolve<'a>(
        &'a self,
        resource: &Path,
        issuer: Option<&Path>,
        out: &mut Vec<&'a Rule>,
    ) -> bool {
        if !self.matches(resource, issuer) {
            return false;
        }

        if !self.action.is_none() {
            out.push(self);
        }

        if !self.one_of.is_empty() {
            for child in &self.one_of {
                if child.resolve(resource, issuer, out) {
                    break;
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn re(pattern: &str) -> Condition {
        Condition::regex(pattern).unwrap()
    }

    #[test]
    fn use_item_deserializes_from_string_or_object() {
        let items: Vec<UseItem> = serde_json::from_value(json!([
            "sass-loader",
            { "loader": "less-loader", "options": { "lessOptions": {} } }
        ]))
        .unwrap();

        assert_eq!(items[0], UseItem::new("sass-loader"));
        assert_eq!(items[1].loader, "less-loader");
        assert!(items[1].options.is_some());
    }

    #[test]
    fn rule_without_conditions_matches_everything() {
        let rule = Rule::new().uses(vec![UseItem::new("x")]);
        assert!(rule.matches(Path::new("/a.css"), None));
    }

    #[test]
    fn exclude_rejects_matching_resource() {
        let rule = Rule::new().exclude(re(r"\.json$"));
        assert!(!rule.matches(Path::new("/a.json"), None));
        assert!(rule.matches(Path::new("/a.svg"), None));
    }

    #[test]
    fn issuer_condition_fails_for_entry_points() {
        let rule = Rule::new().issuer(Condition::path("/app"));
        assert!(!rule.matches(Path::new("/app/a.css"), None));
        assert!(rule.matches(Path::new("/app/a.css"), Some(Path::new("/app/index.js"))));
    }

    #[test]
    fn one_of_stops_at_first_match() {
        let group = Rule::one_of([
            Rule::new().test(re(r"\.css$")).uses(vec![UseItem::new("first")]),
            Rule::new().test(re(r"\.css$")).uses(vec![UseItem::new("second")]),
        ]);

        let mut out = Vec::new();
        assert!(group.resolve(Path::new("/a.css"), None, &mut out));
        assert_eq!(out.len(), 1);
        match &out[0].action {
            RuleAction::Use(items) => assert_eq!(items[0].loader, "first"),
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn sentinel_group_is_detected() {
        let group = Rule::one_of([Rule::new().test(re("a^")).action(RuleAction::Sentinel)]);
        assert!(group.is_css_rule_group());
        assert!(!Rule::one_of([Rule::new()]).is_css_rule_group());
    }

    #[test]
    fn serializes_action_and_camel_case_fields() {
        let rule = Rule::new()
            .side_effects(false)
            .uses(vec![UseItem::new("css-loader")]);
        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(value["sideEffects"], json!(false));
        assert_eq!(value["action"]["use"][0]["loader"], json!("css-loader"));
        assert!(value.get("test").is_none());
    }
}
