use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the bundler configuration produced for one build target
    Rules(RulesArgs),

    /// Configure the server and client targets of one build and report problems
    Check(CheckArgs),

    /// Show the rule a stylesheet resolves to when imported from a file
    Explain(ExplainArgs),
}

/// Build target.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    Client,
    Server,
}

impl Target {
    pub fn is_server(self) -> bool {
        matches!(self, Target::Server)
    }
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Project root
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub root: PathBuf,

    /// Configuration file (defaults to fob-css.toml or fob-css.json in the root)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Configure a development build instead of a production build
    #[arg(long)]
    pub dev: bool,
}

#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Build target to configure
    #[arg(short, long, value_enum, default_value_t = Target::Client)]
    pub target: Target,

    /// Minimizers the host already registers; the CSS minimizer is appended to them
    #[arg(long = "minimizer", value_name = "NAME")]
    pub minimizers: Vec<String>,

    /// Print compact JSON instead of pretty-printed JSON
    #[arg(long)]
    pub compact: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

#[derive(Args, Debug)]
pub struct ExplainArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Stylesheet or asset being imported, relative to the root
    #[arg(value_name = "RESOURCE")]
    pub resource: PathBuf,

    /// Importing file, relative to the root; omitted for entry points
    #[arg(long, value_name = "FILE")]
    pub issuer: Option<PathBuf>,

    /// Build target to configure
    #[arg(short, long, value_enum, default_value_t = Target::Client)]
    pub target: Target,
}
