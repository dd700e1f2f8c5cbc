//! Check command implementation.
//!
//! Configures the server and then the client target of one build, exactly as
//! a host would, so every warning and error the plugin reports is surfaced
//! once.

use fob_css_rules::BuildConfiguration;

use crate::cli::{CheckArgs, Target};
use crate::commands::utils::{Project, target_name};
use crate::error::Result;
use crate::ui;

pub fn execute(args: CheckArgs) -> Result<()> {
    let project = Project::open(&args.project)?;
    ui::info(&format!(
        "Checking CSS configuration in {} ({} build)...",
        project.root.display(),
        if project.dev { "development" } else { "production" }
    ));

    for target in [Target::Server, Target::Client] {
        let config = match project.configure(BuildConfiguration::new(), target) {
            Ok(config) => config,
            Err(err) => {
                ui::error(&format!("{} target could not be configured", target_name(target)));
                return Err(err);
            }
        };
        let rules = config.css_rule_group().map_or(0, |group| group.one_of.len());
        ui::success(&format!("{} target: {rules} CSS rules", target_name(target)));
    }

    ui::success("CSS configuration is valid!");
    Ok(())
}
