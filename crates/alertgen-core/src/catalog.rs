//! The concrete alert rules, one per enabled category.

use tracing::debug;

use crate::config::{AlertCategory, AlertsConfig, ProjectionAlertConfig, ThresholdAlertConfig};
use crate::error::Result;
use crate::rule::{AlertRule, ComparisonOperator, ThresholdExpression};

/// Mount points considered physical drives: the root filesystem, `/home`
/// and numbered data volumes, as seen from inside the exporter container.
pub const PHYSICAL_MOUNTPOINTS: &str = r"^/rootfs$|/rootfs/home$|/rootfs/mnt/data[0-9]+$";

/// CPU usage percentage across instances.
pub const CPU_USAGE_EXPR: &str =
    r#"100 - (avg by(instance) (irate(node_cpu_seconds_total{mode="idle"}[5m])) * 100)"#;

/// Memory usage percentage.
pub const MEMORY_USAGE_EXPR: &str =
    "100 * (1 - (node_memory_MemAvailable_bytes / node_memory_MemTotal_bytes))";

fn physical_drive_selector() -> String {
    format!(r#"{{mountpoint=~"{PHYSICAL_MOUNTPOINTS}",fstype!="tmpfs"}}"#)
}

/// Storage usage percentage on physical drives.
pub fn storage_usage_expr() -> String {
    let selector = physical_drive_selector();
    format!(
        "100 * (1 - (node_filesystem_avail_bytes{selector} / node_filesystem_size_bytes{selector}))"
    )
}

/// Available bytes on physical drives, linearly projected `horizon_secs`
/// ahead using the trend over `lookback`.
pub fn storage_projection_expr(lookback: &str, horizon_secs: u64) -> String {
    let selector = physical_drive_selector();
    format!("predict_linear(node_filesystem_avail_bytes{selector}[{lookback}], {horizon_secs})")
}

/// Builds the rule of every enabled category, in category order.
///
/// # Errors
///
/// Propagates [`crate::AlertGenError::InvalidRule`] from the rule builder.
pub fn build_rules(config: &AlertsConfig) -> Result<Vec<AlertRule>> {
    let mut rules = Vec::new();

    if let Some(cfg) = &config.cpu {
        rules.push(cpu_rule(cfg)?);
    }
    if let Some(cfg) = &config.memory {
        rules.push(memory_rule(cfg)?);
    }
    if let Some(cfg) = &config.storage {
        rules.push(storage_rule(cfg)?);
    }
    if let Some(cfg) = &config.storage_projection {
        rules.push(storage_projection_rule(cfg)?);
    }

    for rule in &rules {
        let condition = rule
            .threshold_expression()
            .and_then(ThresholdExpression::evaluator)
            .map(|(op, value)| format!("{op} {value}"));
        debug!(
            uid = %rule.uid,
            alert_type = ?rule.alert_type(),
            condition = ?condition,
            "built alert rule"
        );
    }
    Ok(rules)
}

/// CPU usage above the configured percentage.
pub fn cpu_rule(cfg: &ThresholdAlertConfig) -> Result<AlertRule> {
    let t = cfg.threshold_percent;
    let d = cfg.sustained_duration;
    AlertRule::builder("cpu-usage-alert", "CPU Usage Alert", CPU_USAGE_EXPR)
        .summary(format!("CPU usage has been above {t}% for {d}"))
        .description(format!("CPU usage has exceeded {t}% for {d}"))
        .for_duration(d)
        .threshold(ComparisonOperator::GreaterThan, t)
        .category(AlertCategory::Cpu)
        .build()
}

/// Memory usage above the configured percentage.
pub fn memory_rule(cfg: &ThresholdAlertConfig) -> Result<AlertRule> {
    let t = cfg.threshold_percent;
    let d = cfg.sustained_duration;
    AlertRule::builder("memory-usage-alert", "Memory Usage Alert", MEMORY_USAGE_EXPR)
        .summary(format!("Memory usage is at {{{{ $values.B }}}}% (threshold: {t}%)"))
        .description(format!("Memory usage has exceeded {t}% for {d}"))
        .for_duration(d)
        .threshold(ComparisonOperator::GreaterThan, t)
        .category(AlertCategory::Memory)
        .build()
}

/// Usage of any physical drive above the configured percentage.
pub fn storage_rule(cfg: &ThresholdAlertConfig) -> Result<AlertRule> {
    let t = cfg.threshold_percent;
    AlertRule::builder(
        "storage-alert-physical-drives",
        "Storage Alert - Physical Drives",
        storage_usage_expr(),
    )
    .summary("Storage alert: {{ $labels.mountpoint }} is above threshold")
    .description(format!("Physical drive storage has exceeded {t}%"))
    .for_duration(cfg.sustained_duration)
    .threshold(ComparisonOperator::GreaterThan, t)
    .category(AlertCategory::Storage)
    .build()
}

/// A physical drive projected to run out of space within the horizon.
///
/// Fires when the projected available bytes drop below zero.
pub fn storage_projection_rule(cfg: &ProjectionAlertConfig) -> Result<AlertRule> {
    let days = cfg.days_until_full_threshold;
    let lookback = cfg.lookback_window.to_string();
    AlertRule::builder(
        "storage-projection-alert",
        "Storage Projection Alert - Physical Drives",
        storage_projection_expr(&lookback, cfg.horizon_secs()),
    )
    .summary(format!(
        "Storage on {{{{ $labels.mountpoint }}}} is projected to fill within {days} days"
    ))
    .description(format!(
        "Linear projection over the last {lookback} predicts available bytes reach zero within {days} days"
    ))
    .for_duration(cfg.sustained_duration)
    .threshold(ComparisonOperator::LessThan, 0.0)
    .category(AlertCategory::StorageProjection)
    .build()
}
