//! Rule construction and first-match resolution.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fob_css_rules::{
    BuildConfiguration, BuildSession, BundlerPlugin, ConfigurationContext, MemoryReporter,
    Minimizer, PreprocessorItem, Rule, RuleAction, UseItem, configure_css,
};
use serde_json::json;
use tempfile::TempDir;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("pages")).unwrap();
        fs::write(dir.path().join("pages").join("_app.js"), "").unwrap();
        fs::write(dir.path().join(".postcssrc.json"), r#"{ "plugins": {} }"#).unwrap();
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    fn app_file(&self) -> PathBuf {
        self.path("pages/_app.js")
    }

    fn client(&self) -> ConfigurationContext {
        ConfigurationContext::new(self.root()).custom_app_file(Some(self.app_file()))
    }

    fn server(&self) -> ConfigurationContext {
        self.client().server(true)
    }
}

fn pre_processors() -> Vec<PreprocessorItem> {
    vec![
        PreprocessorItem::new(["scss", "sass"], vec![UseItem::new("sass-loader")]),
        PreprocessorItem::new(["less"], vec![UseItem::new("less-loader")]),
    ]
}

fn configure(ctx: &ConfigurationContext, items: &[PreprocessorItem]) -> BuildConfiguration {
    let mut config = BuildConfiguration::with_minimizers([Minimizer::Named("terser".into())]);
    let session = BuildSession::with_reporter(Arc::new(MemoryReporter::new()));
    configure_css(&mut config, items, ctx, &session).unwrap();
    config
}

fn single<'a>(rules: Vec<&'a Rule>) -> &'a Rule {
    assert_eq!(rules.len(), 1, "expected exactly one acting rule, got {rules:#?}");
    rules[0]
}

fn loaders(rule: &Rule) -> Vec<&str> {
    match &rule.action {
        RuleAction::Use(items) => items.iter().map(|i| i.loader.as_str()).collect(),
        other => panic!("expected a transform chain, got {other:?}"),
    }
}

fn error_body(rule: &Rule) -> &str {
    match &rule.action {
        RuleAction::Error(message) => &message.body,
        other => panic!("expected an error rule, got {other:?}"),
    }
}

#[test]
fn everything_lands_in_one_group() {
    let project = Project::new();
    let config = configure(&project.client(), &pre_processors());

    assert_eq!(config.module.rules.len(), 1);
    let group = config.css_rule_group().unwrap();
    assert!(matches!(group.one_of[0].action, RuleAction::Sentinel));
    assert!(group.test.as_ref().unwrap().matches(Path::new("/x/a.less")));
    assert!(!group.test.as_ref().unwrap().matches(Path::new("/x/a.js")));
}

#[test]
fn client_group_order() {
    let project = Project::new();
    let config = configure(&project.client(), &pre_processors());
    let group = &config.css_rule_group().unwrap().one_of;

    // sentinel, document, 3 module rules, module error, dependency globals,
    // 3 app globals, global dependency error, global error, assets
    assert_eq!(group.len(), 13);

    let module_rules: Vec<usize> = group
        .iter()
        .enumerate()
        .filter(|(_, r)| r.side_effects == Some(false))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(module_rules, vec![2, 3, 4]);

    let global_rules: Vec<usize> = group
        .iter()
        .enumerate()
        .filter(|(_, r)| r.side_effects == Some(true))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(global_rules, vec![6, 7, 8, 9]);

    assert!(error_body(&group[1]).contains("pages/_document.js"));
    assert!(error_body(&group[5]).contains("CSS Modules cannot be imported"));
    assert!(error_body(&group[10]).contains("from within 'node_modules'"));
    assert!(error_body(&group[11]).contains("Custom <App>"));
    assert_eq!(loaders(&group[12]), vec!["file-loader"]);
}

#[test]
fn server_group_order() {
    let project = Project::new();
    let config = configure(&project.server(), &pre_processors());
    let group = &config.css_rule_group().unwrap().one_of;

    assert_eq!(group.len(), 9);
    assert_eq!(loaders(&group[6]), vec!["ignore-loader"]);
    assert!(group.iter().all(|r| r.side_effects != Some(true)));
}

#[test]
fn no_app_globals_without_custom_app() {
    let project = Project::new();
    let ctx = ConfigurationContext::new(project.root());
    let config = configure(&ctx, &pre_processors());
    let group = &config.css_rule_group().unwrap().one_of;

    assert_eq!(group.len(), 10);
    assert!(error_body(&group[8]).contains("pages/_app.js"));
}

#[test]
fn css_module_from_application_uses_module_chain() {
    let project = Project::new();
    let config = configure(&project.client(), &pre_processors());

    let rule = single(config.resolve(
        &project.path("components/button.module.css"),
        Some(&project.path("pages/index.js")),
    ));

    assert_eq!(rule.side_effects, Some(false));
    assert_eq!(
        loaders(rule),
        vec!["mini-css-extract-plugin/loader", "css-loader", "postcss-loader"]
    );
}

#[test]
fn root_condition_compares_as_string_prefix() {
    let project = Project::new();
    let config = configure(&project.client(), &[]);
    let sibling = PathBuf::from(format!("{}-shared", project.root().display()));

    let rule = single(config.resolve(
        &sibling.join("button.module.css"),
        Some(&sibling.join("button.js")),
    ));

    assert_eq!(rule.side_effects, Some(false));
    assert_eq!(loaders(rule)[1], "css-loader");
}

#[test]
fn preprocessor_module_chain_ends_with_its_loaders() {
    let project = Project::new();
    let config = configure(&project.client().development(true), &pre_processors());

    let rule = single(config.resolve(
        &project.path("components/card.module.sass"),
        Some(&project.path("components/card.js")),
    ));

    assert_eq!(
        loaders(rule),
        vec!["next-style-loader", "css-loader", "postcss-loader", "sass-loader"]
    );
    let RuleAction::Use(chain) = &rule.action else { unreachable!() };
    assert_eq!(chain[1].options.as_ref().unwrap()["importLoaders"], json!(2));
}

#[test]
fn global_css_never_uses_module_chain() {
    let project = Project::new();
    let config = configure(&project.client(), &pre_processors());

    for issuer in ["pages/index.js", "pages/_app.js", "components/a.js"] {
        let rule = single(config.resolve(&project.path("styles/site.css"), Some(&project.path(issuer))));
        assert_ne!(rule.side_effects, Some(false), "{issuer}");
    }
}

#[test]
fn css_module_inside_node_modules_is_an_error() {
    let project = Project::new();
    let config = configure(&project.client(), &pre_processors());

    let rule = single(config.resolve(
        &project.path("node_modules/ui/button.module.scss"),
        Some(&project.path("node_modules/ui/index.js")),
    ));

    assert!(error_body(rule).contains("CSS Modules cannot be imported from within 'node_modules'"));
    let RuleAction::Error(message) = &rule.action else { unreachable!() };
    assert_eq!(message.help_link.as_deref(), Some("https://err.sh/next.js/css-modules-npm"));
}

#[test]
fn css_module_issued_outside_root_is_an_error() {
    let project = Project::new();
    let config = configure(&project.client(), &pre_processors());

    let rule = single(config.resolve(
        &project.path("a.module.css"),
        Some(Path::new("/somewhere/else/index.js")),
    ));
    assert!(matches!(rule.action, RuleAction::Error(_)));
}

#[test]
fn global_css_from_a_page_is_an_error() {
    let project = Project::new();
    let config = configure(&project.client(), &pre_processors());

    let rule = single(config.resolve(&project.path("styles/site.scss"), Some(&project.path("pages/index.js"))));

    let body = error_body(rule);
    assert!(body.contains("Global CSS cannot be imported from files other than your Custom <App>"));
    assert!(body.contains("pages/_app.js"));
}

#[test]
fn global_css_from_custom_app_uses_global_chain() {
    let project = Project::new();
    let config = configure(&project.client(), &pre_processors());

    let rule = single(config.resolve(&project.path("styles/site.less"), Some(&project.app_file())));

    assert_eq!(rule.side_effects, Some(true));
    assert_eq!(
        loaders(rule),
        vec!["mini-css-extract-plugin/loader", "css-loader", "postcss-loader", "less-loader"]
    );
}

#[test]
fn dependency_css_from_application_is_allowed() {
    let project = Project::new();
    let config = configure(&project.client(), &pre_processors());

    let rule = single(config.resolve(
        &project.path("node_modules/bootstrap/dist/bootstrap.css"),
        Some(&project.path("pages/index.js")),
    ));

    assert_eq!(rule.side_effects, Some(true));
    assert_eq!(loaders(rule).len(), 3);
}

#[test]
fn global_css_imported_by_a_dependency_is_an_error() {
    let project = Project::new();
    let config = configure(&project.client(), &pre_processors());

    let rule = single(config.resolve(
        &project.path("node_modules/ui/theme.css"),
        Some(&project.path("node_modules/ui/index.js")),
    ));

    assert_eq!(error_body(rule), "Global CSS cannot be imported from within 'node_modules'.");
}

#[test]
fn css_in_document_is_an_error() {
    let project = Project::new();
    let config = configure(&project.client(), &pre_processors());

    let rule = single(config.resolve(
        &project.path("styles/a.module.css"),
        Some(&project.path("pages/_document.js")),
    ));

    assert!(error_body(rule).starts_with("CSS cannot be imported within pages/_document.js"));
}

#[test]
fn server_ignores_global_css() {
    let project = Project::new();
    let config = configure(&project.server(), &pre_processors());

    let rule = single(config.resolve(&project.path("styles/site.sass"), Some(&project.app_file())));
    assert_eq!(loaders(rule), vec!["ignore-loader"]);

    let module = single(config.resolve(
        &project.path("components/a.module.css"),
        Some(&project.path("components/a.js")),
    ));
    let RuleAction::Use(chain) = &module.action else { unreachable!() };
    assert_eq!(chain[0].loader, "css-loader");
    assert_eq!(chain[0].options.as_ref().unwrap()["modules"]["exportOnlyLocals"], json!(true));
}

#[test]
fn asset_rule_only_on_client() {
    let project = Project::new();

    let client = configure(&project.client(), &[]);
    let last = client.css_rule_group().unwrap().one_of.last().unwrap();
    let RuleAction::Use(chain) = &last.action else {
        panic!("expected the asset rule last");
    };
    assert_eq!(chain[0].loader, "file-loader");
    assert_eq!(
        chain[0].options,
        Some(json!({ "name": "static/media/[name].[hash].[ext]" }))
    );
    assert!(last.issuer.as_ref().unwrap().matches(Path::new("/app/a.css")));
    assert!(last.exclude.as_ref().unwrap().matches(Path::new("/app/a.tsx")));
    assert!(!last.exclude.as_ref().unwrap().matches(Path::new("/app/logo.svg")));

    let server = configure(&project.server(), &[]);
    let group = server.css_rule_group().unwrap();
    assert!(group.one_of.iter().all(|r| r.issuer.as_ref().is_none_or(|c| !c.matches(Path::new("/app/a.css")))));
}

#[test]
fn production_client_registers_extraction_and_minifier() {
    let project = Project::new();
    let config = configure(&project.client(), &[]);

    assert_eq!(config.plugins.len(), 1);
    let BundlerPlugin::ExtractCss(options) = &config.plugins[0];
    assert_eq!(options.filename, "static/css/[contenthash].css");
    assert_eq!(options.chunk_filename, "static/css/[contenthash].css");
    assert!(options.ignore_order);
    assert_eq!(
        config.optimization.minimizer,
        Some(vec![Minimizer::Named("terser".into()), Minimizer::Css])
    );
}

#[test]
fn development_and_server_skip_extraction() {
    let project = Project::new();

    for ctx in [project.client().development(true), project.server()] {
        let config = configure(&ctx, &[]);
        assert!(config.plugins.is_empty());
        assert_eq!(config.optimization.minimizer, Some(vec![Minimizer::Named("terser".into())]));
    }
}

#[test]
fn repeated_configuration_merges_into_the_same_group() {
    let project = Project::new();
    let ctx = project.client();
    let session = BuildSession::with_reporter(Arc::new(MemoryReporter::new()));

    let mut config = BuildConfiguration::new();
    config.add_rule(Rule::new().uses(vec![UseItem::new("babel-loader")]));
    configure_css(&mut config, &[], &ctx, &session).unwrap();
    let first = config.css_rule_group().unwrap().one_of.len();
    configure_css(&mut config, &[], &ctx, &session).unwrap();

    assert_eq!(config.module.rules.len(), 2);
    assert_eq!(loaders(&config.module.rules[0]), vec!["babel-loader"]);
    assert_eq!(config.css_rule_group().unwrap().one_of.len(), first * 2);
}

#[test]
fn configuration_serializes_to_json() {
    let project = Project::new();
    let config = configure(&project.client(), &pre_processors());
    let value = serde_json::to_value(&config).unwrap();

    let group = &value["module"]["rules"][0];
    assert_eq!(group["test"], json!(r"/\.(css|scss|sass|less)$/"));
    assert_eq!(group["oneOf"][0]["action"], json!("sentinel"));
    assert_eq!(value["plugins"][0]["extract_css"]["ignoreOrder"], json!(true));
}
