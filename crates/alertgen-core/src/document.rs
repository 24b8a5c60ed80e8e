//! Provisioning documents and their rendering.

use serde::{Deserialize, Serialize};

use crate::duration::GrafanaDuration;
use crate::error::Result;
use crate::policy::NotificationPolicy;
use crate::rule::AlertRule;

/// Provisioning file format version.
pub const API_VERSION: u32 = 1;

/// Grafana organisation the rules belong to.
pub const ORG_ID: u32 = 1;

/// Name of the generated rule group.
pub const RULE_GROUP_NAME: &str = "server_monitoring_alerts";

/// Folder the rule group is provisioned into.
pub const RULE_FOLDER: &str = "Server Monitoring";

/// Comment block prepended to every generated file.
pub const GENERATED_HEADER: &str = "\
# This file is auto-generated by alertgen from alerts_config.json.
# Do not edit it by hand; changes are overwritten on the next run.
# Edit alerts_config.json and run `alertgen generate` instead.
";

/// A group of rules evaluated together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleGroup {
    /// Owning organisation.
    pub org_id: u32,
    /// Group name.
    pub name: String,
    /// Folder title.
    pub folder: String,
    /// Evaluation interval.
    pub interval: GrafanaDuration,
    /// Rules in generation order.
    pub rules: Vec<AlertRule>,
}

/// The alert-rule provisioning document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRulesDocument {
    /// File format version.
    pub api_version: u32,
    /// Rule groups; always exactly one.
    pub groups: Vec<RuleGroup>,
}

impl AlertRulesDocument {
    /// Wraps rules in the single server monitoring group.
    #[must_use]
    pub fn new(interval: GrafanaDuration, rules: Vec<AlertRule>) -> Self {
        Self {
            api_version: API_VERSION,
            groups: vec![RuleGroup {
                org_id: ORG_ID,
                name: RULE_GROUP_NAME.to_string(),
                folder: RULE_FOLDER.to_string(),
                interval,
                rules,
            }],
        }
    }

    /// Iterates over every rule of every group.
    pub fn rules(&self) -> impl Iterator<Item = &AlertRule> {
        self.groups.iter().flat_map(|g| g.rules.iter())
    }
}

/// The notification-policy provisioning document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPoliciesDocument {
    /// File format version.
    pub api_version: u32,
    /// Policy trees; always exactly one root.
    pub policies: Vec<NotificationPolicy>,
}

impl NotificationPoliciesDocument {
    /// Wraps a root policy.
    #[must_use]
    pub fn new(root: NotificationPolicy) -> Self {
        Self {
            api_version: API_VERSION,
            policies: vec![root],
        }
    }
}

/// Renders a document as YAML behind [`GENERATED_HEADER`].
///
/// Keys keep struct declaration order.
pub fn render<T: Serialize>(document: &T) -> Result<String> {
    let body = serde_yaml::to_string(document)?;
    let mut out = String::with_capacity(GENERATED_HEADER.len() + body.len());
    out.push_str(GENERATED_HEADER);
    out.push_str(&body);
    Ok(out)
}
