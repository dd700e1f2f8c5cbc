//! Command-line interface definition.
//!
//! - `fob-css rules` - print the generated bundler configuration as JSON
//! - `fob-css check` - configure both build targets and report problems
//! - `fob-css explain` - show which rule a stylesheet import resolves to

mod commands;

use clap::Parser;

pub use commands::{CheckArgs, Command, ExplainArgs, ProjectArgs, RulesArgs, Target};

/// fob-css - CSS rules for global stylesheets, CSS modules and pre-processors
#[derive(Parser, Debug)]
#[command(
    name = "fob-css",
    version,
    about = "Inspect the CSS bundler rules generated for a project",
    long_about = "fob-css builds the bundler rules that route global CSS, CSS modules and\n\
                  pre-processor stylesheets (Sass, Less, Stylus, ...) through the CSS toolchain,\n\
                  and lets you print, check and explain them."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}
