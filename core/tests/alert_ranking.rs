//! Alert ranking tests.
//!
//! Order: unresolved before resolved, then critical > warning > info >
//! success, then newest first. Full ties keep their input order.

use chrono::{TimeZone, Utc};
use ecfa_core::{
    model::{Alert, AlertSeverity, AlertSource},
    AlertRanker,
};

fn alert(id: &str, severity: AlertSeverity, day: u32, resolved: bool) -> Alert {
    Alert {
        id: id.to_string(),
        severity,
        message: format!("alert {id}"),
        timestamp: Utc.with_ymd_and_hms(2027, 3, day, 12, 0, 0).unwrap(),
        resolved,
        source: AlertSource::Campaign {
            campaign_id: "cmp".to_string(),
        },
    }
}

fn ids(alerts: &[Alert]) -> Vec<&str> {
    alerts.iter().map(|a| a.id.as_str()).collect()
}

#[test]
fn empty_input_ranks_to_empty() {
    assert!(AlertRanker::rank(Vec::new()).is_empty());
}

#[test]
fn severity_order() {
    let ranked = AlertRanker::rank(vec![
        alert("success", AlertSeverity::Success, 5, false),
        alert("info", AlertSeverity::Info, 5, false),
        alert("critical", AlertSeverity::Critical, 5, false),
        alert("warning", AlertSeverity::Warning, 5, false),
    ]);
    assert_eq!(ids(&ranked), vec!["critical", "warning", "info", "success"]);
}

#[test]
fn unresolved_before_resolved() {
    let ranked = AlertRanker::rank(vec![
        alert("resolved-critical", AlertSeverity::Critical, 9, true),
        alert("open-info", AlertSeverity::Info, 1, false),
    ]);
    assert_eq!(ids(&ranked), vec!["open-info", "resolved-critical"]);
}

#[test]
fn newest_first_within_severity() {
    let ranked = AlertRanker::rank(vec![
        alert("old", AlertSeverity::Warning, 1, false),
        alert("new", AlertSeverity::Warning, 8, false),
        alert("mid", AlertSeverity::Warning, 4, false),
    ]);
    assert_eq!(ids(&ranked), vec!["new", "mid", "old"]);
}

#[test]
fn full_ties_keep_input_order() {
    let input = vec![
        alert("b", AlertSeverity::Warning, 3, false),
        alert("a", AlertSeverity::Warning, 3, false),
        alert("x", AlertSeverity::Critical, 1, false),
        alert("c", AlertSeverity::Warning, 3, false),
    ];
    let ranked = AlertRanker::rank(input);
    assert_eq!(ids(&ranked), vec!["x", "b", "a", "c"]);
}
