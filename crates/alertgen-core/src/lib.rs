//! Grafana alert provisioning generator.
//!
//! `alertgen-core` turns a small JSON description of which alert categories
//! are enabled, and with which thresholds, into the two provisioning files
//! Grafana reads at startup: an alert-rule document and a notification-policy
//! document.
//!
//! # Features
//!
//! - **Alert Rules**: CPU, memory, storage and storage-projection rules, each
//!   a three-stage query → reduce → threshold pipeline
//! - **Notification Policies**: one route per enabled category with a repeat
//!   interval derived from its notification interval
//! - **Deterministic Output**: identical input produces byte-identical files
//! - **Paired Writes**: both documents are built before either file is written
//!
//! # Example
//!
//! ```rust
//! use alertgen_core::{AlertsConfig, compile};
//!
//! let config = AlertsConfig::from_json_str(r#"{
//!     "check_interval": "1m",
//!     "cpu_alerts": {
//!         "enabled": true,
//!         "threshold_percent": 90,
//!         "sustained_duration": "5m",
//!         "notification_interval": "15m"
//!     },
//!     "memory_alerts": { "enabled": false },
//!     "storage_alerts": { "enabled": false },
//!     "storage_projection_alerts": { "enabled": false }
//! }"#).unwrap();
//!
//! let artifacts = compile(&config).unwrap();
//! assert_eq!(artifacts.rule_count(), 1);
//! assert!(artifacts.notification_policies_yaml().contains("repeat_interval: 14m"));
//! ```
//!
//! # Durations
//!
//! ```rust
//! use alertgen_core::duration::{parse_duration_to_seconds, seconds_to_duration};
//!
//! assert_eq!(parse_duration_to_seconds("6h").unwrap(), 21_600);
//! assert_eq!(seconds_to_duration(840), "14m");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod catalog;
pub mod compiler;
pub mod config;
pub mod document;
pub mod duration;
pub mod error;
pub mod policy;
pub mod rule;

// Re-export main types at crate root
pub use compiler::{
    ALERT_RULES_FILE, CompiledArtifacts, NOTIFICATION_POLICIES_FILE, WrittenArtifacts, compile,
};
pub use config::{AlertCategory, AlertsConfig, ProjectionAlertConfig, ThresholdAlertConfig};
pub use document::{AlertRulesDocument, NotificationPoliciesDocument, RuleGroup};
pub use duration::{GrafanaDuration, parse_duration_to_seconds, seconds_to_duration};
pub use error::{AlertGenError, Result};
pub use policy::{NotificationPolicy, NotificationRoute, repeat_interval};
pub use rule::{AlertRule, AlertRuleBuilder, ComparisonOperator, QueryStage, StageModel};
