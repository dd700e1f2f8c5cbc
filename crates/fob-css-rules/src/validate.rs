//! Validation of the `preProcessors` option.

use serde_json::Value;

use crate::bundler::BuildConfiguration;
use crate::context::WebpackContext;
use crate::error::{Error, Result};
use crate::messages::Message;
use crate::plugin::PreProcessors;
use crate::rules::PreprocessorItem;

const RULE_LINK: &str = "https://webpack.js.org/configuration/module/#rule";

const UNCONFIGURED_SUFFIX: &str = "This may not be intentional. Without configuration, only plain CSS will be parsed by Webpack (in which case, the usage of this plugin is unnecessary).";

/// Check `pre_processors` and turn it into descriptors.
///
/// A missing or falsy value yields no descriptors and a warning, reported at
/// most once per build session. A factory is called with the build
/// configuration and context and its result validated in its place.
pub fn validate_plugin_configuration(
    pre_processors: Option<&PreProcessors>,
    config: &BuildConfiguration,
    ctx: &WebpackContext,
) -> Result<Vec<PreprocessorItem>> {
    match pre_processors {
        None => validate_value(&Value::Null, ctx, false),
        Some(PreProcessors::Static(value)) => validate_value(value, ctx, false),
        Some(PreProcessors::Factory(factory)) => {
            let value = factory(config, ctx);
            tracing::debug!(build = ctx.target_name(), "called preProcessors factory");
            validate_value(&value, ctx, true)
        }
    }
}

fn validate_value(value: &Value, ctx: &WebpackContext, from_factory: bool) -> Result<Vec<PreprocessorItem>> {
    if value.is_null() {
        ctx.session.report_missing_pre_processors(Message::warning(format!(
            "The value given to preProcessors is null or undefined. {UNCONFIGURED_SUFFIX}"
        )));
        return Ok(Vec::new());
    }

    if is_falsy(value) {
        ctx.session.report_missing_pre_processors(Message::warning(format!(
            "The value given to preProcessors is falsey. {UNCONFIGURED_SUFFIX}"
        )));
        return Ok(Vec::new());
    }

    let Value::Array(items) = value else {
        return Err(raise(
            ctx,
            Message::error(
                "The value given to preProcessors is not an array or a function. Please provide an array of objects to configure your CSS pre-processors.",
            ),
        ));
    };

    let mut validated = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let refs = CodeRefs::new(i, from_factory);
        check_use(item.get("use"), &refs, ctx)?;
        check_extensions(item.get("extensions"), &refs, ctx)?;

        let item: PreprocessorItem = serde_json::from_value(item.clone())
            .map_err(|e| raise(ctx, Message::error(format!("{}: {e}", refs.item))))?;
        validated.push(item);
    }

    tracing::debug!(count = validated.len(), "validated pre-processors");
    Ok(validated)
}

/// Labels naming a descriptor's fields in messages.
struct CodeRefs {
    item: String,
    use_items: String,
    extensions: String,
}

impl CodeRefs {
    fn new(i: usize, from_factory: bool) -> Self {
        let item = if from_factory {
            format!("preProcessors() => [{i}]")
        } else {
            format!("preProcessors[{i}]")
        };
        Self {
            use_items: format!("{item}.use"),
            extensions: format!("{item}.extensions"),
            item,
        }
    }
}

fn check_use(value: Option<&Value>, refs: &CodeRefs, ctx: &WebpackContext) -> Result<()> {
    const ADVICE: &str = "Please provide an array of objects to configure your additional loaders.";
    let label = &refs.use_items;

    let problem = match value {
        None | Some(Value::Null) => format!("The value given to {label} is null or undefined. {ADVICE}"),
        Some(v) if is_falsy(v) => format!("The value given to {label} is falsey. {ADVICE}"),
        Some(Value::Array(loaders)) if loaders.is_empty() => {
            format!("The array given to {label} contains zero elements. {ADVICE}")
        }
        Some(Value::Array(loaders)) => {
            match loaders.iter().position(|loader| !is_use_item(loader)) {
                Some(k) => format!(
                    "The value given to {label}[{k}] is not a loader. Please provide a loader name or an object with a `loader` string."
                ),
                None => return Ok(()),
            }
        }
        Some(_) => format!("The value given to {label} is not an array. {ADVICE}"),
    };

    Err(raise(ctx, Message::error(problem).with_help_link(RULE_LINK)))
}

fn check_extensions(value: Option<&Value>, refs: &CodeRefs, ctx: &WebpackContext) -> Result<()> {
    const ADVICE: &str = "Please provide an array of strings to configure additional CSS pre-processor extensions.";
    let label = &refs.extensions;

    let problem = match value {
        None | Some(Value::Null) => format!("The value given to {label} is null or undefined. {ADVICE}"),
        Some(v) if is_falsy(v) => format!("The value given to {label} is falsey. {ADVICE}"),
        Some(Value::Array(extensions)) if extensions.is_empty() => format!(
            "The array given to {label} contains zero elements. Please provide at least one CSS pre-processor extension."
        ),
        Some(Value::Array(extensions)) => match extensions.iter().position(|ext| !ext.is_string()) {
            Some(j) => format!(
                "The value given to {label}[{j}] is not a string. Please provide pre-processor extensions as strings."
            ),
            None => return Ok(()),
        },
        Some(_) => format!("The value given to {label} is not an array. {ADVICE}"),
    };

    Err(raise(ctx, Message::error(problem)))
}

fn is_use_item(value: &Value) -> bool {
    match value {
        Value::String(name) => !name.is_empty(),
        Value::Object(fields) => fields.get("loader").is_some_and(Value::is_string),
        _ => false,
    }
}

/// `false`, `0` and `""`.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn raise(ctx: &WebpackContext, message: Message) -> Error {
    let error = Error::malformed_plugin_configuration(message.body.clone());
    ctx.session.report(message);
    error
}
