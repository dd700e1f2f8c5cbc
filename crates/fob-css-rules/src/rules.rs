//! CSS rule construction.
//!
//! [`configure_css`] appends one ordered `one_of` group to the bundler's rule
//! list. Inside the group the first matching rule wins, so the order below is
//! what enforces where global CSS and CSS modules may be imported from.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::bundler::{
    BuildConfiguration, BundlerPlugin, Condition, ExtractCssOptions, Minimizer, Rule, RuleAction,
    UseItem,
};
use crate::context::{BuildSession, ConfigurationContext};
use crate::error::Result;
use crate::loaders::{css_module_loader, global_css_loader};
use crate::messages::Message;
use crate::postcss::load_postcss_plugins;

pub const IGNORE_LOADER: &str = "ignore-loader";
pub const FILE_LOADER: &str = "file-loader";

/// Output name for assets referenced from stylesheets.
pub const ASSET_FILENAME: &str = "static/media/[name].[hash].[ext]";

/// Output name for extracted stylesheets and their chunks.
pub const EXTRACTED_CSS_FILENAME: &str = "static/css/[contenthash].css";

const CSS_GLOBAL_LINK: &str = "https://err.sh/next.js/css-global";
const CSS_NPM_LINK: &str = "https://err.sh/next.js/css-npm";
const CSS_MODULES_NPM_LINK: &str = "https://err.sh/next.js/css-modules-npm";

/// A CSS pre-processor: the file extensions it owns and the loaders that turn
/// them into CSS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessorItem {
    pub extensions: Vec<String>,
    #[serde(rename = "use")]
    pub use_items: Vec<UseItem>,
}

impl PreprocessorItem {
    pub fn new<I, S>(extensions: I, use_items: Vec<UseItem>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
            use_items,
        }
    }
}

/// File conditions derived from one set of extensions.
#[derive(Debug, Clone)]
pub struct PreProcessorMatcher {
    pub extensions: Vec<String>,
    pub use_items: Vec<UseItem>,
    /// `.<ext>` files that are not `.module.<ext>`.
    pub global: Condition,
    /// `.module.<ext>` files.
    pub modules: Condition,
}

impl PreProcessorMatcher {
    pub fn new(extensions: Vec<String>, use_items: Vec<UseItem>) -> Result<Self> {
        let alternatives = alternation(&extensions);
        let modules = Condition::regex(&format!(r"\.module\.({alternatives})$"))?;
        let global = Condition::regex(&format!(r"\.({alternatives})$"))?.and_not([modules.clone()]);

        Ok(Self {
            extensions,
            use_items,
            global,
            modules,
        })
    }

    /// The built-in matcher for plain `.css` files.
    pub fn css() -> Result<Self> {
        Self::new(vec!["css".to_string()], Vec::new())
    }
}

fn alternation<S: AsRef<str>>(extensions: &[S]) -> String {
    extensions
        .iter()
        .map(|ext| regex::escape(ext.as_ref()))
        .collect::<Vec<_>>()
        .join("|")
}

/// Every distinct extension, `css` first, in first-seen order.
pub fn all_css_extensions(pre_processors: &[PreprocessorItem]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    std::iter::once("css")
        .chain(
            pre_processors
                .iter()
                .flat_map(|item| item.extensions.iter().map(String::as_str)),
        )
        .filter(|ext| seen.insert(*ext))
        .map(str::to_string)
        .collect()
}

/// Append the CSS handling rules for `pre_processors` to `config`.
///
/// Everything lands in one `one_of` group, merged into the group of an
/// earlier call when there is one. Production client builds also get the
/// extraction plugin and the CSS minimizer.
///
/// # Example
///
/// ```no_run
/// use fob_css_rules::{
///     BuildConfiguration, BuildSession, ConfigurationContext, PreprocessorItem, UseItem, configure_css,
/// };
///
/// let mut config = BuildConfiguration::new();
/// let items = [PreprocessorItem::new(["scss"], vec![UseItem::new("sass-loader")])];
/// let ctx = ConfigurationContext::new("/app").server(true);
///
/// configure_css(&mut config, &items, &ctx, &BuildSession::new()).unwrap();
/// assert!(config.css_rule_group().is_some());
/// ```
pub fn configure_css(
    config: &mut BuildConfiguration,
    pre_processors: &[PreprocessorItem],
    ctx: &ConfigurationContext,
    session: &BuildSession,
) -> Result<()> {
    let mut matchers = vec![PreProcessorMatcher::css()?];
    for item in pre_processors {
        matchers.push(PreProcessorMatcher::new(
            item.extensions.clone(),
            item.use_items.clone(),
        )?);
    }

    let like_css = Condition::regex(&format!(
        r"\.({})$",
        alternation(&all_css_extensions(pre_processors))
    ))?;
    let node_modules = Condition::regex("node_modules")?;
    let in_application =
        Condition::all([Condition::path(&ctx.root_directory)]).and_not([node_modules.clone()]);
    let all_globals = Condition::any(matchers.iter().map(|m| m.global.clone()));
    let app_file = ctx.custom_app_display();

    let postcss = load_postcss_plugins(&ctx.root_directory, ctx.is_production, session)?;
    let rules_before = config.module.rules.len();

    // The group's own test lets a host detect and drop its built-in CSS support.
    config.add_rule(
        Rule::one_of([Rule::new()
            .test(Condition::regex("a^")?)
            .action(RuleAction::Sentinel)])
        .test(like_css.clone()),
    );

    config.add_rule(Rule::one_of([Rule::new()
        .test(like_css.clone())
        .issuer(Condition::regex(r"pages[\\/]_document\.")?)
        .error(Message::error(format!(
            "CSS cannot be imported within pages/_document.js. Please move global styles to {app_file}"
        )))]));

    for matcher in &matchers {
        config.add_rule(Rule::one_of([Rule::new()
            .side_effects(false)
            .test(matcher.modules.clone())
            .issuer(in_application.clone())
            .uses(css_module_loader(ctx, &postcss, &matcher.use_items)?)]));
    }

    config.add_rule(Rule::one_of([Rule::new()
        .test(Condition::any(matchers.iter().map(|m| m.modules.clone())))
        .error(
            Message::error("CSS Modules cannot be imported from within 'node_modules'.")
                .with_help_link(CSS_MODULES_NPM_LINK),
        )]));

    if ctx.is_server {
        config.add_rule(Rule::one_of([Rule::new()
            .test(all_globals.clone())
            .uses(vec![UseItem::new(IGNORE_LOADER)])]));
    } else {
        config.add_rule(Rule::one_of([Rule::new()
            .side_effects(true)
            .test(matchers[0].global.clone())
            .include(Condition::all([node_modules.clone()]))
            .issuer(in_application.clone())
            .uses(global_css_loader(ctx, &postcss, &[])?)]));

        if let Some(app) = &ctx.custom_app_file {
            for matcher in &matchers {
                config.add_rule(Rule::one_of([Rule::new()
                    .side_effects(true)
                    .test(matcher.global.clone())
                    .issuer(Condition::all([Condition::path(app)]))
                    .uses(global_css_loader(ctx, &postcss, &matcher.use_items)?)]));
            }
        }
    }

    config.add_rule(Rule::one_of([Rule::new()
        .test(all_globals.clone())
        .issuer(Condition::all([node_modules]))
        .error(
            Message::error("Global CSS cannot be imported from within 'node_modules'.")
                .with_help_link(CSS_NPM_LINK),
        )]));

    config.add_rule(Rule::one_of([Rule::new().test(all_globals).error(
        Message::error(format!(
            "Global CSS cannot be imported from files other than your Custom <App>. Please move all global CSS imports to {app_file}. Or, convert the import to Component-level CSS (CSS Modules)."
        ))
        .with_help_link(CSS_GLOBAL_LINK),
    )]));

    if ctx.is_client {
        config.add_rule(Rule::one_of([Rule::new()
            .issuer(like_css)
            .exclude(Condition::any([
                Condition::regex(r"\.(js|mjs|jsx|ts|tsx)$")?,
                Condition::regex(r"\.html$")?,
                Condition::regex(r"\.json$")?,
            ]))
            .uses(vec![UseItem::with_options(
                FILE_LOADER,
                json!({ "name": ASSET_FILENAME }),
            )])]));
    }

    if ctx.is_client && ctx.is_production {
        config.add_plugin(BundlerPlugin::ExtractCss(ExtractCssOptions {
            filename: EXTRACTED_CSS_FILENAME.to_string(),
            chunk_filename: EXTRACTED_CSS_FILENAME.to_string(),
            ignore_order: true,
        }));
        config.add_minimizer(Minimizer::Css);
    }

    tracing::debug!(
        target_server = ctx.is_server,
        matchers = matchers.len(),
        group_size = config.css_rule_group().map_or(0, |group| group.one_of.len()),
        new_top_level_rules = config.module.rules.len() - rules_before,
        "configured CSS rules"
    );
    Ok(())
}
