//! Check command implementation.
//!
//! Compiles the configuration in memory and reports what would be generated.

use std::io::Write;

use alertgen_core::{AlertCategory, AlertsConfig, compile};

use crate::cli::{CheckArgs, Format};
use crate::error::CliError;
use crate::output::{CategoryStatus, CheckSummary};

/// Handler for `alertgen check`.
pub struct CheckCommand<'a> {
    args: &'a CheckArgs,
}

impl<'a> CheckCommand<'a> {
    /// Creates a new check command handler.
    #[must_use]
    pub const fn new(args: &'a CheckArgs) -> Self {
        Self { args }
    }

    /// Executes the command.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid.
    pub fn execute<W: Write>(&self, out: &mut W, format: Format) -> Result<(), CliError> {
        let config = AlertsConfig::load(&self.args.config)?;
        let artifacts = compile(&config)?;
        let root = artifacts.notification_policies.policies.first();

        let categories = AlertCategory::ALL
            .into_iter()
            .map(|category| {
                let rule_uid = artifacts
                    .alert_rules
                    .rules()
                    .find(|r| r.alert_type() == Some(category.label()))
                    .map(|r| r.uid.clone());
                let repeat_interval = root
                    .and_then(|p| p.route(category))
                    .map(|r| r.repeat_interval.to_string());
                CategoryStatus {
                    category: category.label().to_string(),
                    enabled: config.is_enabled(category),
                    rule_uid,
                    repeat_interval,
                }
            })
            .collect();

        let summary = CheckSummary {
            check_interval: config.check_interval.to_string(),
            root_repeat_interval: root
                .map(|p| p.repeat_interval.to_string())
                .unwrap_or_default(),
            rule_count: artifacts.rule_count(),
            categories,
        };
        format.emit(out, &summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reports_enabled_categories_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("alerts_config.json");
        fs::write(
            &config_path,
            r#"{
                "check_interval": "1m",
                "cpu_alerts": { "enabled": false },
                "memory_alerts": { "enabled": false },
                "storage_alerts": {
                    "enabled": true,
                    "threshold_percent": 80,
                    "sustained_duration": "1m",
                    "notification_interval": "1h"
                },
                "storage_projection_alerts": {
                    "enabled": true,
                    "days_until_full_threshold": 30,
                    "lookback_window": "6h",
                    "sustained_duration": "30m",
                    "notification_interval": "1d"
                }
            }"#,
        )
        .unwrap();

        let args = CheckArgs { config: config_path };
        let mut out = Vec::new();
        CheckCommand::new(&args)
            .execute(&mut out, Format::Json)
            .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["rule_count"], 2);
        assert_eq!(value["root_repeat_interval"], "59m");
        assert_eq!(value["categories"][0]["enabled"], false);
        assert_eq!(value["categories"][2]["repeat_interval"], "59m");
        assert_eq!(value["categories"][3]["rule_uid"], "storage-projection-alert");
        assert_eq!(value["categories"][3]["repeat_interval"], "1439m");

        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
