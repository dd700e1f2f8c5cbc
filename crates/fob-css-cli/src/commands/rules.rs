//! Rules command implementation.

use std::io::Write;

use fob_css_rules::{BuildConfiguration, Minimizer};

use crate::cli::RulesArgs;
use crate::commands::utils::{Project, target_name};
use crate::error::{CliError, Result};

/// Print the bundler configuration for one target as JSON on stdout.
///
/// With `--minimizer`, the configuration starts out with that minimizer list,
/// so the CSS minimizer added for client production builds shows up too.
pub fn execute(args: RulesArgs) -> Result<()> {
    if args.minimizers.iter().any(|name| name.trim().is_empty()) {
        return Err(CliError::InvalidArgument("--minimizer requires a non-empty name".to_string()));
    }

    let project = Project::open(&args.project)?;

    let base = if args.minimizers.is_empty() {
        BuildConfiguration::new()
    } else {
        BuildConfiguration::with_minimizers(args.minimizers.into_iter().map(Minimizer::Named))
    };

    tracing::info!(build = target_name(args.target), dev = project.dev, "configuring rules");
    let config = project.configure(base, args.target)?;

    let json = if args.compact {
        serde_json::to_string(&config)?
    } else {
        serde_json::to_string_pretty(&config)?
    };
    writeln!(std::io::stdout().lock(), "{json}")?;

    Ok(())
}
