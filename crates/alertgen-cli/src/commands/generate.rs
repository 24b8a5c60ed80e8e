//! Generate command implementation.
//!
//! Loads the configuration, compiles both documents and writes them as a pair.

use std::io::Write;

use alertgen_core::{AlertsConfig, compile};
use tracing::info;

use crate::cli::{Format, GenerateArgs};
use crate::error::CliError;
use crate::output::GenerateSummary;

/// Handler for `alertgen generate`.
pub struct GenerateCommand<'a> {
    args: &'a GenerateArgs,
}

impl<'a> GenerateCommand<'a> {
    /// Creates a new generate command handler.
    #[must_use]
    pub const fn new(args: &'a GenerateArgs) -> Self {
        Self { args }
    }

    /// Executes the command.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or a file cannot be
    /// written. Nothing is written when compilation fails.
    pub fn execute<W: Write>(&self, out: &mut W, format: Format) -> Result<(), CliError> {
        info!(config = %self.args.config.display(), "generating alert provisioning files");

        let config = AlertsConfig::load(&self.args.config)?;
        let artifacts = compile(&config)?;
        let written = artifacts.write_to(&self.args.output_dir)?;

        let summary = GenerateSummary {
            rules_generated: artifacts.rule_count(),
            routes_generated: artifacts.route_count(),
            alert_rules: written.alert_rules.display().to_string(),
            notification_policies: written.notification_policies.display().to_string(),
        };
        format.emit(out, &summary)
    }
}
