//! Explain command implementation.

use std::io::Write;

use fob_css_rules::messages::terminal_width;
use fob_css_rules::{BuildConfiguration, RuleAction};

use crate::cli::ExplainArgs;
use crate::commands::utils::Project;
use crate::error::Result;
use crate::ui;

/// Print the rules acting on `resource` when imported from `issuer`.
///
/// Loader chains are listed in declaration order; the bundler applies them
/// last to first. Rules that fail the import print their framed message.
pub fn execute(args: ExplainArgs) -> Result<()> {
    let project = Project::open(&args.project)?;
    let config = project.configure(BuildConfiguration::new(), args.target)?;

    let resource = project.resolve(&args.resource);
    let issuer = args.issuer.as_deref().map(|issuer| project.resolve(issuer));
    let acting = config.resolve(&resource, issuer.as_deref());

    if acting.is_empty() {
        ui::warning(&format!("No rule matches {}", args.resource.display()));
        return Ok(());
    }

    let mut out = std::io::stdout().lock();
    for rule in acting {
        match &rule.action {
            RuleAction::Use(items) => {
                writeln!(out, "{}:", args.resource.display())?;
                for (index, item) in items.iter().enumerate() {
                    writeln!(out, "  {}. {}", index + 1, item.loader)?;
                }
                if let Some(side_effects) = rule.side_effects {
                    writeln!(out, "  sideEffects: {side_effects}")?;
                }
            }
            RuleAction::Error(message) => {
                writeln!(out, "{}", message.render(terminal_width()))?;
            }
            RuleAction::Sentinel | RuleAction::None => {}
        }
    }

    Ok(())
}
