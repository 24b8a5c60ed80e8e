//! End-to-end compilation: config in, rendered document pair out.
//!
//! [`compile`] is pure and builds both documents in memory. Nothing touches
//! the filesystem until [`CompiledArtifacts::write_to`], which stages both
//! files next to their destinations and only renames them into place once
//! both have been written.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::catalog::build_rules;
use crate::config::AlertsConfig;
use crate::document::{AlertRulesDocument, NotificationPoliciesDocument, render};
use crate::error::{AlertGenError, Result};
use crate::policy::build_policy;

/// File name of the alert-rule document.
pub const ALERT_RULES_FILE: &str = "alert_rules.yml";

/// File name of the notification-policy document.
pub const NOTIFICATION_POLICIES_FILE: &str = "notification_policies.yml";

/// Both documents of a run, built and rendered.
#[derive(Debug, Clone)]
pub struct CompiledArtifacts {
    /// The alert-rule document.
    pub alert_rules: AlertRulesDocument,
    /// The notification-policy document.
    pub notification_policies: NotificationPoliciesDocument,
    alert_rules_yaml: String,
    notification_policies_yaml: String,
}

/// Paths written by [`CompiledArtifacts::write_to`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifacts {
    /// Path of the alert-rule document.
    pub alert_rules: PathBuf,
    /// Path of the notification-policy document.
    pub notification_policies: PathBuf,
}

/// Builds and renders both documents.
///
/// # Errors
///
/// Returns [`AlertGenError::InvalidRule`] if a rule cannot be assembled or
/// [`AlertGenError::Serialization`] if rendering fails.
pub fn compile(config: &AlertsConfig) -> Result<CompiledArtifacts> {
    let rules = build_rules(config)?;
    let alert_rules = AlertRulesDocument::new(config.check_interval, rules);
    let notification_policies = NotificationPoliciesDocument::new(build_policy(config));

    let alert_rules_yaml = render(&alert_rules)?;
    let notification_policies_yaml = render(&notification_policies)?;

    let artifacts = CompiledArtifacts {
        alert_rules,
        notification_policies,
        alert_rules_yaml,
        notification_policies_yaml,
    };
    debug!(
        rules = artifacts.rule_count(),
        routes = artifacts.route_count(),
        "compiled provisioning documents"
    );
    Ok(artifacts)
}

impl CompiledArtifacts {
    /// Number of generated alert rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.alert_rules.rules().count()
    }

    /// Number of category routes under the root policy.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.notification_policies
            .policies
            .iter()
            .map(|p| p.routes.len())
            .sum()
    }

    /// Rendered alert-rule document.
    #[must_use]
    pub fn alert_rules_yaml(&self) -> &str {
        &self.alert_rules_yaml
    }

    /// Rendered notification-policy document.
    #[must_use]
    pub fn notification_policies_yaml(&self) -> &str {
        &self.notification_policies_yaml
    }

    /// Writes both documents into `dir`.
    ///
    /// Each document is first written to a `.tmp` sibling. The final files are
    /// replaced only after both temporary files exist, so a failed write
    /// leaves the previous pair untouched. No `.tmp` file outlives a failed
    /// call.
    ///
    /// # Errors
    ///
    /// Returns [`AlertGenError::Io`] naming the file that could not be written.
    pub fn write_to(&self, dir: &Path) -> Result<WrittenArtifacts> {
        let outputs = [
            (dir.join(ALERT_RULES_FILE), self.alert_rules_yaml.as_str()),
            (
                dir.join(NOTIFICATION_POLICIES_FILE),
                self.notification_policies_yaml.as_str(),
            ),
        ];

        let mut staged = Vec::with_capacity(outputs.len());
        for (path, contents) in &outputs {
            let tmp = tmp_path(path);
            if let Err(e) = fs::write(&tmp, contents) {
                discard(&staged);
                return Err(AlertGenError::io(&tmp, e));
            }
            staged.push(tmp);
        }

        for (i, (tmp, (path, _))) in staged.iter().zip(&outputs).enumerate() {
            if let Err(e) = fs::rename(tmp, path) {
                discard(&staged[i..]);
                return Err(AlertGenError::io(path, e));
            }
            debug!(path = %path.display(), "wrote provisioning file");
        }

        let [(alert_rules, _), (notification_policies, _)] = outputs;
        info!(
            alert_rules = %alert_rules.display(),
            notification_policies = %notification_policies.display(),
            rules = self.rule_count(),
            "provisioning files written"
        );
        Ok(WrittenArtifacts {
            alert_rules,
            notification_policies,
        })
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn discard(staged: &[PathBuf]) {
    for tmp in staged {
        let _ = fs::remove_file(tmp);
    }
}
