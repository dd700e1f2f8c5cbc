//! Logging setup for the `fob-css` CLI.
//!
//! Log lines go to stderr so that command output on stdout stays machine
//! readable.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "fob_css_rules=debug,fob_css_cli=debug";
const QUIET_FILTER: &str = "fob_css_rules=error,fob_css_cli=error";
const DEFAULT_FILTER: &str = "fob_css_rules=info,fob_css_cli=info";

/// Install the global tracing subscriber.
///
/// `--verbose` selects debug level, `--quiet` errors only; otherwise `RUST_LOG`
/// is honored, falling back to info.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = filter_for(verbose, quiet);

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}
