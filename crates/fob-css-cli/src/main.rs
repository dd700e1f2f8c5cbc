//! `fob-css` - inspect the CSS rules generated for a project.

use clap::Parser;
use fob_css_cli::{cli, commands, error, logger, ui};
use miette::Result;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Rules(rules_args) => commands::rules_execute(rules_args),
        cli::Command::Check(check_args) => commands::check_execute(check_args),
        cli::Command::Explain(explain_args) => commands::explain_execute(explain_args),
    };

    result.map_err(error::cli_error_to_miette)
}
