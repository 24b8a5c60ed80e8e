//! Notification policy tree.
//!
//! The root policy sends everything to the default receiver, grouped by alert
//! name. Each enabled category gets a nested route matched on its
//! `alert_type` label, carrying a repeat interval derived from the category's
//! notification interval.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{AlertCategory, AlertsConfig};
use crate::duration::{GrafanaDuration, HOUR};
use crate::rule::ALERT_TYPE_LABEL;

/// Receiver every policy delivers to.
pub const DEFAULT_RECEIVER: &str = "slack-alerts";

/// Wait before sending the first notification of a new group.
pub const GROUP_WAIT: GrafanaDuration = GrafanaDuration::from_secs(10);

/// Repeat interval of the root policy when no category is enabled.
pub const DEFAULT_REPEAT_INTERVAL: GrafanaDuration = GrafanaDuration::from_secs(4 * HOUR);

/// Computes the repeat interval of a category.
///
/// `max(notification - check, check)`: a repeat is only sent on the next
/// evaluation after the interval elapses. Never below `check`.
#[must_use]
pub fn repeat_interval(notification: GrafanaDuration, check: GrafanaDuration) -> GrafanaDuration {
    let check_secs = check.as_secs();
    let secs = notification
        .as_secs()
        .saturating_sub(check_secs)
        .max(check_secs);
    GrafanaDuration::from_secs(secs)
}

/// Builds an equality matcher in Grafana's `label=value` string form.
///
/// The operator is never a YAML scalar of its own: a bare `=` item loads as
/// the YAML 1.1 `value` tag in some parsers.
#[must_use]
pub fn equality_matcher(label: &str, value: &str) -> String {
    format!("{label}={value}")
}

/// A nested route of the root policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRoute {
    /// Receiver of matching alerts.
    pub receiver: String,
    /// Label matchers selecting the alerts of this route.
    pub matchers: Vec<String>,
    /// Spacing between repeated notifications.
    pub repeat_interval: GrafanaDuration,
}

impl NotificationRoute {
    /// Creates the route of one category.
    #[must_use]
    pub fn for_category(category: AlertCategory, repeat_interval: GrafanaDuration) -> Self {
        Self {
            receiver: DEFAULT_RECEIVER.to_string(),
            matchers: vec![equality_matcher(ALERT_TYPE_LABEL, category.label())],
            repeat_interval,
        }
    }

    /// Returns the `alert_type` this route matches, if any.
    #[must_use]
    pub fn alert_type(&self) -> Option<&str> {
        self.matchers.iter().find_map(|m| {
            m.strip_prefix(ALERT_TYPE_LABEL)?
                .strip_prefix('=')
                .filter(|value| !value.starts_with('~'))
        })
    }
}

/// The root notification policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPolicy {
    /// Default receiver.
    pub receiver: String,
    /// Labels alerts are grouped by.
    pub group_by: Vec<String>,
    /// Wait before the first notification of a group.
    pub group_wait: GrafanaDuration,
    /// Wait before notifying about new alerts in an existing group.
    pub group_interval: GrafanaDuration,
    /// Spacing between repeated notifications.
    pub repeat_interval: GrafanaDuration,
    /// Category routes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<NotificationRoute>,
}

impl NotificationPolicy {
    /// Returns the route matching a category, if present.
    #[must_use]
    pub fn route(&self, category: AlertCategory) -> Option<&NotificationRoute> {
        self.routes
            .iter()
            .find(|r| r.alert_type() == Some(category.label()))
    }
}

/// Builds the policy tree for the enabled categories.
///
/// Every enabled category gets its own route, cpu and memory included, so a
/// disabled category is exactly one that has no route. The root repeat
/// interval is the shortest route repeat, or [`DEFAULT_REPEAT_INTERVAL`] when
/// nothing is enabled.
#[must_use]
pub fn build_policy(config: &AlertsConfig) -> NotificationPolicy {
    let check = config.check_interval;

    let routes: Vec<_> = config
        .enabled_categories()
        .filter_map(|category| {
            let notification = config.notification_interval(category)?;
            let repeat = repeat_interval(notification, check);
            debug!(
                %category,
                notification = %notification,
                repeat = %repeat,
                repeat_secs = repeat.as_secs(),
                "computed repeat interval"
            );
            Some(NotificationRoute::for_category(category, repeat))
        })
        .collect();

    let root_repeat = routes
        .iter()
        .map(|r| r.repeat_interval)
        .min()
        .unwrap_or(DEFAULT_REPEAT_INTERVAL);

    NotificationPolicy {
        receiver: DEFAULT_RECEIVER.to_string(),
        group_by: vec!["alertname".to_string()],
        group_wait: GROUP_WAIT,
        group_interval: check,
        repeat_interval: root_repeat,
        routes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::{CPU_ONLY_CONFIG, FULL_CONFIG};
    use proptest::prelude::*;
    use test_case::test_case;

    fn d(s: &str) -> GrafanaDuration {
        s.parse().unwrap()
    }

    #[test_case("15m", "1m", "14m" ; "subtracts check interval")]
    #[test_case("1h", "1m", "59m" ; "hour minus minute")]
    #[test_case("1d", "1h", "23h" ; "day minus hour")]
    #[test_case("2m", "1m", "1m" ; "equal to floor")]
    #[test_case("1m", "1m", "1m" ; "same as check")]
    #[test_case("30s", "1m", "1m" ; "shorter than check")]
    #[test_case("90s", "1m", "1m" ; "below floor after subtraction")]
    #[test_case("2h", "90s", "7110s" ; "non canonical result")]
    fn repeat_interval_table(notification: &str, check: &str, expected: &str) {
        assert_eq!(repeat_interval(d(notification), d(check)).to_string(), expected);
    }

    #[test]
    fn cpu_only_policy() {
        let config = AlertsConfig::from_json_str(CPU_ONLY_CONFIG).unwrap();
        let policy = build_policy(&config);

        assert_eq!(policy.receiver, "slack-alerts");
        assert_eq!(policy.group_by, vec!["alertname".to_string()]);
        assert_eq!(policy.group_wait.to_string(), "10s");
        assert_eq!(policy.group_interval.to_string(), "1m");
        assert_eq!(policy.repeat_interval.to_string(), "14m");

        assert_eq!(policy.routes.len(), 1);
        assert_eq!(policy.route(AlertCategory::Cpu).unwrap().repeat_interval.to_string(), "14m");
    }

    #[test]
    fn disabled_categories_have_no_route() {
        let config = AlertsConfig::from_json_str(CPU_ONLY_CONFIG).unwrap();
        let policy = build_policy(&config);
        assert!(policy.route(AlertCategory::Memory).is_none());
        assert!(policy.route(AlertCategory::Storage).is_none());
        assert!(policy.route(AlertCategory::StorageProjection).is_none());
    }

    #[test]
    fn full_policy_routes_every_category() {
        let config = AlertsConfig::from_json_str(FULL_CONFIG).unwrap();
        let policy = build_policy(&config);

        let types: Vec<_> = policy.routes.iter().filter_map(NotificationRoute::alert_type).collect();
        assert_eq!(types, vec!["cpu", "memory", "storage", "storage_projection"]);

        assert_eq!(policy.route(AlertCategory::Storage).unwrap().repeat_interval.to_string(), "59m");
        assert_eq!(
            policy.route(AlertCategory::StorageProjection).unwrap().repeat_interval.to_string(),
            "1439m"
        );
        assert_eq!(policy.repeat_interval.to_string(), "14m");
    }

    #[test]
    fn nothing_enabled_uses_default_repeat() {
        let json = CPU_ONLY_CONFIG.replace(r#""enabled": true"#, r#""enabled": false"#);
        let config = AlertsConfig::from_json_str(&json).unwrap();
        let policy = build_policy(&config);
        assert!(policy.routes.is_empty());
        assert_eq!(policy.repeat_interval, DEFAULT_REPEAT_INTERVAL);
        assert_eq!(policy.repeat_interval.to_string(), "4h");
    }

    #[test]
    fn route_serializes_label_matcher_string() {
        let route = NotificationRoute::for_category(AlertCategory::Storage, d("59m"));
        let value = serde_json::to_value(&route).unwrap();
        assert_eq!(value["matchers"][0], "alert_type=storage");
        assert_eq!(value["repeat_interval"], "59m");
        assert_eq!(route.alert_type(), Some("storage"));
    }

    #[test]
    fn regex_matcher_is_not_an_alert_type() {
        let route = NotificationRoute {
            receiver: DEFAULT_RECEIVER.to_string(),
            matchers: vec!["alert_type=~storage.*".to_string()],
            repeat_interval: d("1h"),
        };
        assert_eq!(route.alert_type(), None);
    }

    proptest! {
        #[test]
        fn prop_repeat_interval_never_below_check(
            notification in 0u64..1_000_000,
            check in 1u64..100_000,
        ) {
            let repeat = repeat_interval(
                GrafanaDuration::from_secs(notification),
                GrafanaDuration::from_secs(check),
            );
            prop_assert!(repeat.as_secs() >= check);
            prop_assert!(repeat.as_secs() <= notification.max(check));
        }

        #[test]
        fn prop_repeat_interval_survives_format_round_trip(
            notification in 0u64..1_000_000,
            check in 1u64..100_000,
        ) {
            let repeat = repeat_interval(
                GrafanaDuration::from_secs(notification),
                GrafanaDuration::from_secs(check),
            );
            let reparsed: GrafanaDuration = repeat.to_string().parse().unwrap();
            prop_assert_eq!(reparsed, repeat);
        }
    }
}
