//! Formatting shared by the console and the JSON API.

use chrono::{DateTime, Utc};

use crate::refs::K8sRef;
use crate::types::Condition;

/// Sentinel shown when a reference or value is absent.
pub const UNKNOWN: &str = "Unknown";

/// `namespace/name`, `name`, or `Unknown`.
pub fn ref_or_unknown(r: Option<&K8sRef>) -> String {
    match r {
        Some(r) if !r.name.is_empty() => r.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// `Type=Status` pairs joined by `, `, or `-` when there are none.
pub fn format_conditions(conditions: &[Condition]) -> String {
    if conditions.is_empty() {
        return "-".to_string();
    }
    conditions
        .iter()
        .map(|c| format!("{}={}", c.condition_type, c.status))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Most recent heartbeat across all conditions.
pub fn latest_heartbeat(conditions: &[Condition]) -> Option<DateTime<Utc>> {
    conditions.iter().filter_map(|c| c.last_heartbeat_time).max()
}

/// Coarse age of `since` relative to `now`: `42s`, `5m`, `3h`, `2d`.
/// Timestamps in the future read as `0s`.
pub fn format_age(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = now.signed_duration_since(since).num_seconds().max(0);
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3_599 => format!("{}m", secs / 60),
        3_600..=86_399 => format!("{}h", secs / 3_600),
        _ => format!("{}d", secs / 86_400),
    }
}

/// Heartbeat age for a condition set, `Unknown` when no heartbeat exists.
pub fn heartbeat_age(conditions: &[Condition], now: DateTime<Utc>) -> String {
    latest_heartbeat(conditions)
        .map(|ts| format_age(ts, now))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn condition(kind: &str, status: &str, hb: Option<DateTime<Utc>>) -> Condition {
        Condition {
            condition_type: kind.into(),
            status: status.into(),
            last_heartbeat_time: hb,
            reason: None,
            message: None,
        }
    }

    #[test]
    fn ref_display_variants() {
        assert_eq!(ref_or_unknown(None), "Unknown");
        assert_eq!(ref_or_unknown(Some(&K8sRef::new("node-1"))), "node-1");
        assert_eq!(
            ref_or_unknown(Some(&K8sRef::namespaced("kube-system", "ctrl-0"))),
            "kube-system/ctrl-0"
        );
        assert_eq!(ref_or_unknown(Some(&K8sRef::new(""))), "Unknown");
    }

    #[test]
    fn conditions_join_in_order() {
        let conds = vec![
            condition("ControllerHealthy", "True", None),
            condition("Ready", "False", None),
        ];
        assert_eq!(format_conditions(&conds), "ControllerHealthy=True, Ready=False");
        assert_eq!(format_conditions(&[]), "-");
    }

    #[test]
    fn age_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(format_age(now - Duration::seconds(42), now), "42s");
        assert_eq!(format_age(now - Duration::minutes(5), now), "5m");
        assert_eq!(format_age(now - Duration::hours(3), now), "3h");
        assert_eq!(format_age(now - Duration::days(2), now), "2d");
        assert_eq!(format_age(now + Duration::seconds(10), now), "0s");
    }

    #[test]
    fn heartbeat_picks_latest() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let conds = vec![
            condition("A", "True", Some(now - Duration::hours(2))),
            condition("B", "True", Some(now - Duration::seconds(30))),
            condition("C", "True", None),
        ];
        assert_eq!(heartbeat_age(&conds, now), "30s");
        assert_eq!(heartbeat_age(&[condition("C", "True", None)], now), "Unknown");
    }
}
