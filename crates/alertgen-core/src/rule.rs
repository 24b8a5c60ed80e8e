//! Grafana unified alert rule types.
//!
//! This module provides the records written into the alert-rule document:
//! - [`ComparisonOperator`]: The evaluator used by the threshold stage
//! - [`QueryStage`]: One stage of the A → B → C query pipeline
//! - [`AlertRule`]: A complete rule, assembled with [`AlertRuleBuilder`]
//!
//! Every rule carries the same three-stage pipeline: a Prometheus query (`A`),
//! a reduce-to-last-value expression over `A` (`B`) and a threshold expression
//! over `B` (`C`). Stage `C` is the rule's condition.
//!
//! Struct field order is the serialized key order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::AlertCategory;
use crate::duration::GrafanaDuration;
use crate::error::{AlertGenError, Result};

/// UID of the Prometheus datasource provisioned alongside the rules.
pub const PROMETHEUS_DATASOURCE_UID: &str = "prometheus";

/// UID Grafana reserves for server-side expressions.
pub const EXPRESSION_DATASOURCE_UID: &str = "-100";

/// Look-back window of the raw query stage, in seconds.
pub const QUERY_LOOKBACK_SECS: u64 = 600;

/// Label carrying the alert category; notification routes match on it.
pub const ALERT_TYPE_LABEL: &str = "alert_type";

const QUERY_REF: &str = "A";
const REDUCE_REF: &str = "B";
const CONDITION_REF: &str = "C";

/// Comparison operators supported by the threshold stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    /// Fires when the value is above the threshold.
    #[default]
    #[serde(rename = "gt")]
    GreaterThan,
    /// Fires when the value is below the threshold.
    #[serde(rename = "lt")]
    LessThan,
}

impl ComparisonOperator {
    /// Returns the Grafana evaluator type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GreaterThan => "gt",
            Self::LessThan => "lt",
        }
    }
}

impl std::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Datasource reference inside a stage model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceRef {
    /// Datasource type (`prometheus` or `__expr__`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Datasource UID.
    pub uid: String,
}

impl DatasourceRef {
    fn prometheus() -> Self {
        Self {
            kind: "prometheus".to_string(),
            uid: PROMETHEUS_DATASOURCE_UID.to_string(),
        }
    }

    fn expression() -> Self {
        Self {
            kind: "__expr__".to_string(),
            uid: EXPRESSION_DATASOURCE_UID.to_string(),
        }
    }
}

/// Time range a stage queries, relative to evaluation time, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeTimeRange {
    /// Seconds before evaluation time.
    pub from: u64,
    /// Seconds before evaluation time.
    pub to: u64,
}

/// Stage `A`: raw Prometheus query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrometheusQuery {
    /// PromQL expression.
    pub expr: String,
    /// Query step; empty lets Grafana choose.
    pub interval: String,
    /// Stage reference.
    #[serde(rename = "refId")]
    pub ref_id: String,
    /// Datasource reference.
    pub datasource: DatasourceRef,
}

/// Stage `B`: reduce expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReduceExpression {
    /// Datasource reference.
    pub datasource: DatasourceRef,
    /// Input stage.
    pub expression: String,
    /// Reducer function.
    pub reducer: String,
    /// Stage reference.
    #[serde(rename = "refId")]
    pub ref_id: String,
    /// Always `reduce`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Evaluator of a classic condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluator {
    /// Threshold values.
    pub params: Vec<f64>,
    /// Comparison applied.
    #[serde(rename = "type")]
    pub kind: ComparisonOperator,
}

/// A `{type: ...}` wrapper used by Grafana for condition operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    /// The wrapped type name.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Stage reference list of a condition query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionQuery {
    /// Referenced stages.
    pub params: Vec<String>,
}

/// One condition of the threshold stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCondition {
    /// Comparison and threshold.
    pub evaluator: Evaluator,
    /// Boolean combinator with other conditions.
    pub operator: TypeRef,
    /// Stage being compared.
    pub query: ConditionQuery,
    /// Always `query`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Stage `C`: threshold expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdExpression {
    /// Datasource reference.
    pub datasource: DatasourceRef,
    /// Conditions combined into the result.
    pub conditions: Vec<ThresholdCondition>,
    /// Input stage.
    pub expression: String,
    /// Stage reference.
    #[serde(rename = "refId")]
    pub ref_id: String,
    /// Always `threshold`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl ThresholdExpression {
    /// Returns the comparison and threshold of the first condition.
    #[must_use]
    pub fn evaluator(&self) -> Option<(ComparisonOperator, f64)> {
        let evaluator = &self.conditions.first()?.evaluator;
        Some((evaluator.kind, *evaluator.params.first()?))
    }
}

/// Model of a query stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StageModel {
    /// Raw Prometheus query.
    Query(PrometheusQuery),
    /// Reduce expression.
    Reduce(ReduceExpression),
    /// Threshold expression.
    Threshold(ThresholdExpression),
}

/// One entry of a rule's `data` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryStage {
    /// Stage reference.
    pub ref_id: String,
    /// Time range queried.
    pub relative_time_range: RelativeTimeRange,
    /// Datasource the stage runs against.
    pub datasource_uid: String,
    /// Stage model.
    pub model: StageModel,
}

impl QueryStage {
    fn query(expr: String) -> Self {
        Self {
            ref_id: QUERY_REF.to_string(),
            relative_time_range: RelativeTimeRange {
                from: QUERY_LOOKBACK_SECS,
                to: 0,
            },
            datasource_uid: PROMETHEUS_DATASOURCE_UID.to_string(),
            model: StageModel::Query(PrometheusQuery {
                expr,
                interval: String::new(),
                ref_id: QUERY_REF.to_string(),
                datasource: DatasourceRef::prometheus(),
            }),
        }
    }

    fn reduce() -> Self {
        Self {
            ref_id: REDUCE_REF.to_string(),
            relative_time_range: RelativeTimeRange { from: 0, to: 0 },
            datasource_uid: EXPRESSION_DATASOURCE_UID.to_string(),
            model: StageModel::Reduce(ReduceExpression {
                datasource: DatasourceRef::expression(),
                expression: QUERY_REF.to_string(),
                reducer: "last".to_string(),
                ref_id: REDUCE_REF.to_string(),
                kind: "reduce".to_string(),
            }),
        }
    }

    fn threshold(operator: ComparisonOperator, threshold: f64) -> Self {
        Self {
            ref_id: CONDITION_REF.to_string(),
            relative_time_range: RelativeTimeRange { from: 0, to: 0 },
            datasource_uid: EXPRESSION_DATASOURCE_UID.to_string(),
            model: StageModel::Threshold(ThresholdExpression {
                datasource: DatasourceRef::expression(),
                conditions: vec![ThresholdCondition {
                    evaluator: Evaluator {
                        params: vec![threshold],
                        kind: operator,
                    },
                    operator: TypeRef {
                        kind: "and".to_string(),
                    },
                    query: ConditionQuery {
                        params: vec![REDUCE_REF.to_string()],
                    },
                    kind: "query".to_string(),
                }],
                expression: REDUCE_REF.to_string(),
                ref_id: CONDITION_REF.to_string(),
                kind: "threshold".to_string(),
            }),
        }
    }
}

/// State a rule takes when its query returns no data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoDataState {
    /// Report `NoData`.
    #[default]
    NoData,
}

/// State a rule takes when evaluation errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecErrState {
    /// Treat as firing.
    #[default]
    Alerting,
}

/// Human-readable context attached to a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    /// One-line summary.
    pub summary: String,
    /// Longer description.
    pub description: String,
}

/// A Grafana unified alert rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRule {
    /// Stable identifier.
    pub uid: String,
    /// Human-readable title.
    pub title: String,
    /// Reference of the stage deciding whether the rule fires.
    pub condition: String,
    /// The query pipeline.
    pub data: Vec<QueryStage>,
    /// Behaviour when the query returns no data.
    pub no_data_state: NoDataState,
    /// Behaviour when evaluation fails.
    pub exec_err_state: ExecErrState,
    /// How long the condition must hold before firing.
    #[serde(rename = "for")]
    pub for_duration: GrafanaDuration,
    /// Summary and description.
    pub annotations: Annotations,
    /// Labels attached to fired alerts.
    pub labels: BTreeMap<String, String>,
    /// Whether evaluation is paused.
    pub is_paused: bool,
}

impl AlertRule {
    /// Creates a new alert rule builder.
    pub fn builder(
        uid: impl Into<String>,
        title: impl Into<String>,
        expr: impl Into<String>,
    ) -> AlertRuleBuilder {
        AlertRuleBuilder::new(uid, title, expr)
    }

    /// Returns the stage named by [`AlertRule::condition`].
    #[must_use]
    pub fn condition_stage(&self) -> Option<&QueryStage> {
        self.data.iter().find(|s| s.ref_id == self.condition)
    }

    /// Returns the threshold expression of the condition stage.
    #[must_use]
    pub fn threshold_expression(&self) -> Option<&ThresholdExpression> {
        match &self.condition_stage()?.model {
            StageModel::Threshold(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the PromQL expression of the query stage.
    #[must_use]
    pub fn query_expr(&self) -> Option<&str> {
        self.data.iter().find_map(|s| match &s.model {
            StageModel::Query(q) => Some(q.expr.as_str()),
            _ => None,
        })
    }

    /// Returns the `alert_type` label, if set.
    #[must_use]
    pub fn alert_type(&self) -> Option<&str> {
        self.labels.get(ALERT_TYPE_LABEL).map(String::as_str)
    }
}

/// Builder for creating [`AlertRule`] instances.
#[derive(Debug)]
pub struct AlertRuleBuilder {
    uid: String,
    title: String,
    expr: String,
    summary: String,
    description: String,
    for_duration: GrafanaDuration,
    threshold: f64,
    operator: ComparisonOperator,
    labels: BTreeMap<String, String>,
}

impl AlertRuleBuilder {
    fn new(uid: impl Into<String>, title: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            title: title.into(),
            expr: expr.into(),
            summary: String::new(),
            description: String::new(),
            for_duration: GrafanaDuration::from_secs(0),
            threshold: 0.0,
            operator: ComparisonOperator::default(),
            labels: BTreeMap::new(),
        }
    }

    /// Sets the summary annotation.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Sets the description annotation.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets how long the condition must hold before firing.
    #[must_use]
    pub const fn for_duration(mut self, duration: GrafanaDuration) -> Self {
        self.for_duration = duration;
        self
    }

    /// Sets the threshold and comparison of stage `C`.
    #[must_use]
    pub const fn threshold(mut self, operator: ComparisonOperator, value: f64) -> Self {
        self.operator = operator;
        self.threshold = value;
        self
    }

    /// Tags the rule with its category.
    #[must_use]
    pub fn category(self, category: AlertCategory) -> Self {
        self.label(ALERT_TYPE_LABEL, category.label())
    }

    /// Adds a label to the rule.
    #[must_use]
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Builds the [`AlertRule`].
    ///
    /// # Errors
    ///
    /// Returns `AlertGenError::InvalidRule` if the uid, title or expression is
    /// empty, or the threshold is not finite.
    pub fn build(self) -> Result<AlertRule> {
        for (field, value) in [("uid", &self.uid), ("title", &self.title), ("expr", &self.expr)] {
            if value.trim().is_empty() {
                return Err(AlertGenError::InvalidRule {
                    reason: format!("rule {field} cannot be empty"),
                });
            }
        }

        if !self.threshold.is_finite() {
            return Err(AlertGenError::InvalidRule {
                reason: format!("rule {} has a non-finite threshold", self.uid),
            });
        }

        Ok(AlertRule {
            uid: self.uid,
            title: self.title,
            condition: CONDITION_REF.to_string(),
            data: vec![
                QueryStage::query(self.expr),
                QueryStage::reduce(),
                QueryStage::threshold(self.operator, self.threshold),
            ],
            no_data_state: NoDataState::NoData,
            exec_err_state: ExecErrState::Alerting,
            for_duration: self.for_duration,
            annotations: Annotations {
                summary: self.summary,
                description: self.description,
            },
            labels: self.labels,
            is_paused: false,
        })
    }
}
