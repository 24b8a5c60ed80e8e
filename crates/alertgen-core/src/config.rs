//! Loading and validating `alerts_config.json`.
//!
//! The file is deserialized into a loosely-typed raw form first so that absent
//! keys can be reported by their dotted path, then resolved into
//! [`AlertsConfig`]. A category's settings are only required when the
//! category is enabled.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::duration::GrafanaDuration;
use crate::error::{AlertGenError, Result};

/// One monitored dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AlertCategory {
    /// Host CPU usage.
    Cpu,
    /// Host memory usage.
    Memory,
    /// Filesystem usage on physical drives.
    Storage,
    /// Projected filesystem exhaustion on physical drives.
    StorageProjection,
}

impl AlertCategory {
    /// All categories, in generation order.
    pub const ALL: [Self; 4] = [
        Self::Cpu,
        Self::Memory,
        Self::Storage,
        Self::StorageProjection,
    ];

    /// Returns the value used for the `alert_type` label and route matcher.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Memory => "memory",
            Self::Storage => "storage",
            Self::StorageProjection => "storage_projection",
        }
    }

    /// Returns the top-level key of this category in the configuration file.
    #[must_use]
    pub const fn config_key(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu_alerts",
            Self::Memory => "memory_alerts",
            Self::Storage => "storage_alerts",
            Self::StorageProjection => "storage_projection_alerts",
        }
    }
}

impl std::fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Settings of a percentage-threshold category (CPU, memory, storage).
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdAlertConfig {
    /// Usage percentage above which the alert fires.
    pub threshold_percent: f64,
    /// How long the condition must hold before firing.
    pub sustained_duration: GrafanaDuration,
    /// Desired spacing between notifications for a firing alert.
    pub notification_interval: GrafanaDuration,
}

/// Settings of the storage projection category.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionAlertConfig {
    /// Fire when the drive is projected to fill within this many days.
    pub days_until_full_threshold: u32,
    /// Trend window fed to the linear projection.
    pub lookback_window: GrafanaDuration,
    /// How long the condition must hold before firing.
    pub sustained_duration: GrafanaDuration,
    /// Desired spacing between notifications for a firing alert.
    pub notification_interval: GrafanaDuration,
}

impl ProjectionAlertConfig {
    /// The projection horizon in seconds.
    #[must_use]
    pub const fn horizon_secs(&self) -> u64 {
        self.days_until_full_threshold as u64 * crate::duration::DAY
    }
}

/// Validated generator configuration. A disabled category is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertsConfig {
    /// Evaluation cadence of the rule group.
    pub check_interval: GrafanaDuration,
    /// CPU usage alerts.
    pub cpu: Option<ThresholdAlertConfig>,
    /// Memory usage alerts.
    pub memory: Option<ThresholdAlertConfig>,
    /// Storage usage alerts.
    pub storage: Option<ThresholdAlertConfig>,
    /// Storage exhaustion projection alerts.
    pub storage_projection: Option<ProjectionAlertConfig>,
}

impl AlertsConfig {
    /// Reads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`AlertGenError::Io`] if the file cannot be read, or any error
    /// from [`AlertsConfig::from_json_str`].
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AlertGenError::io(path, e))?;
        debug!(path = %path.display(), bytes = contents.len(), "read alerts config");
        Self::from_json_str(&contents)
    }

    /// Parses and validates a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`AlertGenError::MissingKey`] for absent keys,
    /// [`AlertGenError::ConfigFormat`] for malformed durations and
    /// [`AlertGenError::Serialization`] for JSON that does not have the
    /// expected shape.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawAlertsConfig = serde_json::from_str(json)?;
        raw.resolve()
    }

    /// Returns the notification interval of a category, if it is enabled.
    #[must_use]
    pub fn notification_interval(&self, category: AlertCategory) -> Option<GrafanaDuration> {
        match category {
            AlertCategory::Cpu => self.cpu.as_ref().map(|c| c.notification_interval),
            AlertCategory::Memory => self.memory.as_ref().map(|c| c.notification_interval),
            AlertCategory::Storage => self.storage.as_ref().map(|c| c.notification_interval),
            AlertCategory::StorageProjection => self
                .storage_projection
                .as_ref()
                .map(|c| c.notification_interval),
        }
    }

    /// Returns true if the category is enabled.
    #[must_use]
    pub fn is_enabled(&self, category: AlertCategory) -> bool {
        self.notification_interval(category).is_some()
    }

    /// Iterates over the enabled categories in generation order.
    pub fn enabled_categories(&self) -> impl Iterator<Item = AlertCategory> + '_ {
        AlertCategory::ALL
            .into_iter()
            .filter(|c| self.is_enabled(*c))
    }
}

#[derive(Debug, Deserialize)]
struct RawAlertsConfig {
    check_interval: Option<String>,
    cpu_alerts: Option<RawCategory>,
    memory_alerts: Option<RawCategory>,
    storage_alerts: Option<RawCategory>,
    storage_projection_alerts: Option<RawCategory>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    enabled: Option<bool>,
    threshold_percent: Option<f64>,
    #[serde(alias = "evaluation_interval")]
    sustained_duration: Option<String>,
    notification_interval: Option<String>,
    days_until_full_threshold: Option<u32>,
    lookback_window: Option<String>,
}

impl RawAlertsConfig {
    fn resolve(self) -> Result<AlertsConfig> {
        let check_interval = self
            .check_interval
            .as_deref()
            .ok_or_else(|| AlertGenError::missing("check_interval"))
            .and_then(|s| GrafanaDuration::parse_field(s, "check_interval"))?;

        let cpu = resolve_enabled(self.cpu_alerts, AlertCategory::Cpu)?
            .map(|raw| raw.threshold(AlertCategory::Cpu))
            .transpose()?;
        let memory = resolve_enabled(self.memory_alerts, AlertCategory::Memory)?
            .map(|raw| raw.threshold(AlertCategory::Memory))
            .transpose()?;
        let storage = resolve_enabled(self.storage_alerts, AlertCategory::Storage)?
            .map(|raw| raw.threshold(AlertCategory::Storage))
            .transpose()?;
        let storage_projection = resolve_enabled(
            self.storage_projection_alerts,
            AlertCategory::StorageProjection,
        )?
        .map(|raw| raw.projection(AlertCategory::StorageProjection))
        .transpose()?;

        let config = AlertsConfig {
            check_interval,
            cpu,
            memory,
            storage,
            storage_projection,
        };
        debug!(
            check_interval = %config.check_interval,
            enabled = config.enabled_categories().count(),
            "resolved alerts config"
        );
        Ok(config)
    }
}

/// Requires the category block and its `enabled` flag; yields the block only
/// when enabled.
fn resolve_enabled(raw: Option<RawCategory>, category: AlertCategory) -> Result<Option<RawCategory>> {
    let key = category.config_key();
    let raw = raw.ok_or_else(|| AlertGenError::missing(key))?;
    let enabled = raw
        .enabled
        .ok_or_else(|| AlertGenError::missing(format!("{key}.enabled")))?;
    Ok(enabled.then_some(raw))
}

fn require<T>(value: Option<T>, category: AlertCategory, field: &str) -> Result<T> {
    value.ok_or_else(|| AlertGenError::missing(format!("{}.{field}", category.config_key())))
}

fn require_duration(
    value: Option<&str>,
    category: AlertCategory,
    field: &str,
) -> Result<GrafanaDuration> {
    let s = require(value, category, field)?;
    GrafanaDuration::parse_field(s, &format!("{}.{field}", category.config_key()))
}

impl RawCategory {
    fn threshold(self, category: AlertCategory) -> Result<ThresholdAlertConfig> {
        Ok(ThresholdAlertConfig {
            threshold_percent: require(self.threshold_percent, category, "threshold_percent")?,
            sustained_duration: require_duration(
                self.sustained_duration.as_deref(),
                category,
                "sustained_duration",
            )?,
            notification_interval: require_duration(
                self.notification_interval.as_deref(),
                category,
                "notification_interval",
            )?,
        })
    }

    fn projection(self, category: AlertCategory) -> Result<ProjectionAlertConfig> {
        Ok(ProjectionAlertConfig {
            days_until_full_threshold: require(
                self.days_until_full_threshold,
                category,
                "days_until_full_threshold",
            )?,
            lookback_window: require_duration(
                self.lookback_window.as_deref(),
                category,
                "lookback_window",
            )?,
            sustained_duration: require_duration(
                self.sustained_duration.as_deref(),
                category,
                "sustained_duration",
            )?,
            notification_interval: require_duration(
                self.notification_interval.as_deref(),
                category,
                "notification_interval",
            )?,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A configuration with every category enabled.
    pub(crate) const FULL_CONFIG: &str = r#"{
        "check_interval": "1m",
        "cpu_alerts": {
            "enabled": true,
            "threshold_percent": 90,
            "sustained_duration": "5m",
            "notification_interval": "15m"
        },
        "memory_alerts": {
            "enabled": true,
            "threshold_percent": 85,
            "sustained_duration": "10m",
            "notification_interval": "30m"
        },
        "storage_alerts": {
            "enabled": true,
            "threshold_percent": 80,
            "evaluation_interval": "1m",
            "notification_interval": "1h"
        },
        "storage_projection_alerts": {
            "enabled": true,
            "days_until_full_threshold": 30,
            "lookback_window": "6h",
            "sustained_duration": "30m",
            "notification_interval": "1d"
        }
    }"#;

    /// Only the CPU category enabled; the others carry just their flag.
    pub(crate) const CPU_ONLY_CONFIG: &str = r#"{
        "check_interval": "1m",
        "cpu_alerts": {
            "enabled": true,
            "threshold_percent": 90,
            "sustained_duration": "5m",
            "notification_interval": "15m"
        },
        "memory_alerts": { "enabled": false },
        "storage_alerts": { "enabled": false },
        "storage_projection_alerts": { "enabled": false }
    }"#;

    mod category_tests {
        use super::*;

        #[test]
        fn labels_and_keys() {
            assert_eq!(AlertCategory::Cpu.label(), "cpu");
            assert_eq!(AlertCategory::StorageProjection.label(), "storage_projection");
            assert_eq!(AlertCategory::Memory.config_key(), "memory_alerts");
            assert_eq!(
                AlertCategory::StorageProjection.config_key(),
                "storage_projection_alerts"
            );
        }

        #[test]
        fn display_matches_label() {
            assert_eq!(AlertCategory::Storage.to_string(), "storage");
        }
    }

    mod load_tests {
        use super::*;

        #[test]
        fn parses_full_config() {
            let config = AlertsConfig::from_json_str(FULL_CONFIG).unwrap();
            assert_eq!(config.check_interval.as_secs(), 60);

            let cpu = config.cpu.as_ref().unwrap();
            assert!((cpu.threshold_percent - 90.0).abs() < f64::EPSILON);
            assert_eq!(cpu.sustained_duration.to_string(), "5m");
            assert_eq!(cpu.notification_interval.to_string(), "15m");

            let storage = config.storage.as_ref().unwrap();
            assert_eq!(storage.sustained_duration.to_string(), "1m");

            let projection = config.storage_projection.as_ref().unwrap();
            assert_eq!(projection.days_until_full_threshold, 30);
            assert_eq!(projection.lookback_window.to_string(), "6h");
            assert_eq!(projection.horizon_secs(), 2_592_000);

            assert_eq!(config.enabled_categories().count(), 4);
        }

        #[test]
        fn disabled_categories_need_only_the_flag() {
            let config = AlertsConfig::from_json_str(CPU_ONLY_CONFIG).unwrap();
            assert!(config.cpu.is_some());
            assert!(config.memory.is_none());
            assert!(config.storage.is_none());
            assert!(config.storage_projection.is_none());
            assert_eq!(
                config.enabled_categories().collect::<Vec<_>>(),
                vec![AlertCategory::Cpu]
            );
        }

        #[test]
        fn load_reads_from_disk() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("alerts_config.json");
            std::fs::write(&path, CPU_ONLY_CONFIG).unwrap();

            let config = AlertsConfig::load(&path).unwrap();
            assert!(config.is_enabled(AlertCategory::Cpu));
        }

        #[test]
        fn load_missing_file_is_io_error() {
            let dir = tempfile::tempdir().unwrap();
            let err = AlertsConfig::load(&dir.path().join("absent.json")).unwrap_err();
            assert!(matches!(err, AlertGenError::Io { .. }));
        }
    }

    mod error_tests {
        use super::*;

        fn missing_key(json: &str) -> String {
            match AlertsConfig::from_json_str(json).unwrap_err() {
                AlertGenError::MissingKey { key } => key,
                other => panic!("expected MissingKey, got {other:?}"),
            }
        }

        #[test]
        fn missing_check_interval() {
            let json = CPU_ONLY_CONFIG.replace(r#""check_interval": "1m","#, "");
            assert_eq!(missing_key(&json), "check_interval");
        }

        #[test]
        fn missing_category_block() {
            let json = CPU_ONLY_CONFIG.replace(
                r#""storage_projection_alerts": { "enabled": false }"#,
                r#""unrelated": {}"#,
            );
            assert_eq!(missing_key(&json), "storage_projection_alerts");
        }

        #[test]
        fn missing_enabled_flag() {
            let json = CPU_ONLY_CONFIG.replace(
                r#""memory_alerts": { "enabled": false }"#,
                r#""memory_alerts": {}"#,
            );
            assert_eq!(missing_key(&json), "memory_alerts.enabled");
        }

        #[test]
        fn missing_threshold_on_enabled_category() {
            let json = CPU_ONLY_CONFIG.replace(r#""threshold_percent": 90,"#, "");
            assert_eq!(missing_key(&json), "cpu_alerts.threshold_percent");
        }

        #[test]
        fn missing_lookback_on_enabled_projection() {
            let json = FULL_CONFIG.replace(r#""lookback_window": "6h","#, "");
            assert_eq!(missing_key(&json), "storage_projection_alerts.lookback_window");
        }

        #[test]
        fn malformed_duration_names_key() {
            let json = CPU_ONLY_CONFIG.replace(r#""15m""#, r#""15 minutes""#);
            match AlertsConfig::from_json_str(&json).unwrap_err() {
                AlertGenError::ConfigFormat { key, value, .. } => {
                    assert_eq!(key, "cpu_alerts.notification_interval");
                    assert_eq!(value, "15 minutes");
                }
                other => panic!("expected ConfigFormat, got {other:?}"),
            }
        }

        #[test]
        fn malformed_check_interval() {
            let json = CPU_ONLY_CONFIG.replace(r#""check_interval": "1m""#, r#""check_interval": "1.5m""#);
            let err = AlertsConfig::from_json_str(&json).unwrap_err();
            assert!(matches!(err, AlertGenError::ConfigFormat { .. }));
        }

        #[test]
        fn wrong_value_type_is_serialization_error() {
            let json = CPU_ONLY_CONFIG.replace(r#""threshold_percent": 90"#, r#""threshold_percent": "ninety""#);
            let err = AlertsConfig::from_json_str(&json).unwrap_err();
            assert!(matches!(err, AlertGenError::Serialization(_)));
        }

        #[test]
        fn sustained_duration_and_its_alias_together_are_rejected() {
            let json = CPU_ONLY_CONFIG.replace(
                r#""sustained_duration": "5m","#,
                r#""sustained_duration": "5m", "evaluation_interval": "5m","#,
            );
            match AlertsConfig::from_json_str(&json).unwrap_err() {
                AlertGenError::Serialization(msg) => {
                    assert!(msg.contains("duplicate field `sustained_duration`"), "{msg}");
                }
                other => panic!("expected Serialization, got {other:?}"),
            }
        }
    }
}
