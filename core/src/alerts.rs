//! Display ordering for alerts from every evaluator.

use crate::model::Alert;
use std::cmp::Ordering;

pub struct AlertRanker;

impl AlertRanker {
    /// Unresolved first, then critical > warning > info > success, then
    /// newest first. Full ties keep their input order.
    pub fn rank(mut alerts: Vec<Alert>) -> Vec<Alert> {
        // slice::sort_by is stable
        alerts.sort_by(Self::compare);
        alerts
    }

    fn compare(a: &Alert, b: &Alert) -> Ordering {
        a.resolved
            .cmp(&b.resolved)
            .then_with(|| a.severity.rank().cmp(&b.severity.rank()))
            .then_with(|| b.timestamp.cmp(&a.timestamp))
    }
}
