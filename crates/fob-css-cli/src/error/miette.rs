//! Conversion of CLI errors into miette reports.

use miette::Report;

use crate::error::CliError;

pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Rules(e) => Report::new(e),
        other => miette::miette!("{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_errors_keep_their_diagnostic_code() {
        let report = cli_error_to_miette(fob_css_rules::Error::malformed_plugin_configuration("x").into());
        assert_eq!(
            report.code().map(|c| c.to_string()).as_deref(),
            Some("fob::css::malformed_plugin_config")
        );
    }

    #[test]
    fn other_errors_keep_their_message() {
        let report = cli_error_to_miette(CliError::InvalidArgument("--target".into()));
        assert!(report.to_string().contains("--target"));
    }
}
