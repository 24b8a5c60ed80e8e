//! Reports printed by the commands.
//!
//! Every report renders either as plain text for a terminal or as pretty JSON
//! for scripts, selected by the global `--format` flag.

use std::io::{self, Write};

use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// A command result that can be printed in either output format.
pub trait Report: Serialize {
    /// Writes the human-readable rendering.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_text(&self, out: &mut dyn Write) -> io::Result<()>;
}

impl Format {
    /// Prints `report` to `out` in this format.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Format`] if JSON encoding fails and
    /// [`CliError::Io`] if writing fails.
    pub fn emit<W: Write, R: Report>(self, out: &mut W, report: &R) -> Result<(), CliError> {
        match self {
            Self::Table => report.write_text(out)?,
            Self::Json => {
                serde_json::to_writer_pretty(&mut *out, report)
                    .map_err(|e| CliError::Format(e.to_string()))?;
                writeln!(out)?;
            }
        }
        Ok(())
    }
}

/// Result of a `generate` run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateSummary {
    /// Number of alert rules written.
    pub rules_generated: usize,
    /// Number of category routes written.
    pub routes_generated: usize,
    /// Path of the alert-rule document.
    pub alert_rules: String,
    /// Path of the notification-policy document.
    pub notification_policies: String,
}

impl Report for GenerateSummary {
    fn write_text(&self, writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "Generated {} alert rules successfully!", self.rules_generated)?;
        writeln!(writer, "  Alert rules:            {}", self.alert_rules)?;
        writeln!(writer, "  Notification policies:  {}", self.notification_policies)?;
        Ok(())
    }
}

/// Per-category line of a `check` run.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryStatus {
    /// Category label.
    pub category: String,
    /// Whether the category is enabled.
    pub enabled: bool,
    /// UID of the generated rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_uid: Option<String>,
    /// Repeat interval of the category route.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_interval: Option<String>,
}

/// Result of a `check` run.
#[derive(Debug, Clone, Serialize)]
pub struct CheckSummary {
    /// Global evaluation interval.
    pub check_interval: String,
    /// Repeat interval of the root policy.
    pub root_repeat_interval: String,
    /// Number of rules that would be generated.
    pub rule_count: usize,
    /// One entry per category.
    pub categories: Vec<CategoryStatus>,
}

impl Report for CheckSummary {
    fn write_text(&self, writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "Alert Configuration")?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Check interval:   {}", self.check_interval)?;
        writeln!(writer, "Root repeat:      {}", self.root_repeat_interval)?;
        writeln!(writer)?;
        writeln!(writer, "{:<20} {:<10} {:<32} REPEAT", "CATEGORY", "STATUS", "RULE")?;
        for c in &self.categories {
            writeln!(
                writer,
                "{:<20} {:<10} {:<32} {}",
                c.category,
                if c.enabled { "enabled" } else { "disabled" },
                c.rule_uid.as_deref().unwrap_or("-"),
                c.repeat_interval.as_deref().unwrap_or("-"),
            )?;
        }
        writeln!(writer)?;
        writeln!(writer, "{} alert rules would be generated", self.rule_count)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> GenerateSummary {
        GenerateSummary {
            rules_generated: 2,
            routes_generated: 2,
            alert_rules: "config/alert_rules.yml".into(),
            notification_policies: "config/notification_policies.yml".into(),
        }
    }

    fn emitted<R: Report>(format: Format, report: &R) -> String {
        let mut out = Vec::new();
        format.emit(&mut out, report).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn generate_summary_table() {
        let out = emitted(Format::Table, &summary());
        assert!(out.starts_with("Generated 2 alert rules successfully!\n"));
        assert!(out.contains("config/notification_policies.yml"));
    }

    #[test]
    fn generate_summary_json() {
        let out = emitted(Format::Json, &summary());
        assert!(out.ends_with("}\n"));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["rules_generated"], 2);
    }

    #[test]
    fn check_summary_table_lists_categories() {
        let check = CheckSummary {
            check_interval: "1m".into(),
            root_repeat_interval: "14m".into(),
            rule_count: 1,
            categories: vec![
                CategoryStatus {
                    category: "cpu".into(),
                    enabled: true,
                    rule_uid: Some("cpu-usage-alert".into()),
                    repeat_interval: Some("14m".into()),
                },
                CategoryStatus {
                    category: "memory".into(),
                    enabled: false,
                    rule_uid: None,
                    repeat_interval: None,
                },
            ],
        };
        let out = emitted(Format::Table, &check);
        assert!(out.contains("cpu-usage-alert"));
        assert!(out.contains("disabled"));
        assert!(out.contains("1 alert rules would be generated"));

        let json = emitted(Format::Json, &check);
        assert!(!json.contains("\"rule_uid\": null"));
    }
}
