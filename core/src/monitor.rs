//! Spending utilization against statutory limits.
//!
//! Two threshold families live here and must stay separate:
//!   - severity bands (70/90%) classify utilization as pass/warning/fail
//!   - alert triggers (50/80/95%) decide whether and how loudly to alert
//!
//! Neither is related to the 80% high-value donation watch.

use crate::{
    config::{AlertTriggers, SpendingBands, ThresholdConfig},
    error::{EcfaError, EcfaResult},
    model::{Alert, AlertSeverity, AlertSource, ComplianceRule},
    types::{format_kes, Kes, Timestamp},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitSeverity {
    Pass,
    Warning,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitUtilization {
    pub spent: Kes,
    pub limit: Kes,
    /// `round(spent / limit * 100)`
    pub utilization_pct: u64,
    pub severity: LimitSeverity,
}

pub struct SpendingLimitMonitor<'a> {
    bands: &'a SpendingBands,
    triggers: &'a AlertTriggers,
}

impl<'a> SpendingLimitMonitor<'a> {
    pub fn new(config: &'a ThresholdConfig) -> Self {
        Self {
            bands: &config.spending_bands,
            triggers: &config.alert_triggers,
        }
    }

    /// `scope` names the limit in error messages ("overall", "Transport").
    pub fn evaluate(&self, spent: Kes, limit: Kes, scope: &str) -> EcfaResult<LimitUtilization> {
        if limit <= 0 {
            log::warn!("rejected {scope} limit of {limit}");
            return Err(EcfaError::InvalidLimit {
                scope: scope.to_string(),
                limit,
            });
        }
        if spent < 0 {
            log::warn!("rejected {scope} spend of {spent}");
            return Err(EcfaError::InvalidAmount {
                record: format!("{scope} spend"),
                amount: spent,
            });
        }

        let utilization_pct = (spent as f64 * 100.0 / limit as f64).round() as u64;
        let severity = if utilization_pct >= u64::from(self.bands.fail_pct) {
            LimitSeverity::Fail
        } else if utilization_pct >= u64::from(self.bands.warning_pct) {
            LimitSeverity::Warning
        } else {
            LimitSeverity::Pass
        };

        Ok(LimitUtilization {
            spent,
            limit,
            utilization_pct,
            severity,
        })
    }

    /// Alert for the highest trigger crossed, if any.
    pub fn alert(
        &self,
        usage: &LimitUtilization,
        rule: ComplianceRule,
        source: AlertSource,
        scope_label: &str,
        as_of: Timestamp,
    ) -> Option<Alert> {
        let pct = usage.utilization_pct;
        let triggers = self.triggers;
        let (severity, message) = if usage.spent > usage.limit {
            (
                AlertSeverity::Critical,
                format!(
                    "{scope_label} spending of {} has exceeded the {} limit ({pct}%).",
                    format_kes(usage.spent),
                    format_kes(usage.limit)
                ),
            )
        } else if pct >= u64::from(triggers.critical_pct) {
            (
                AlertSeverity::Critical,
                format!(
                    "{scope_label} spending is at {pct}% of the {} limit.",
                    format_kes(usage.limit)
                ),
            )
        } else if pct >= u64::from(triggers.warning_pct) {
            (
                AlertSeverity::Warning,
                format!(
                    "{scope_label} spending has reached {pct}% of the {} limit.",
                    format_kes(usage.limit)
                ),
            )
        } else if pct >= u64::from(triggers.info_pct) {
            (
                AlertSeverity::Info,
                format!(
                    "{scope_label} spending has passed {}% of the {} limit.",
                    triggers.info_pct,
                    format_kes(usage.limit)
                ),
            )
        } else {
            return None;
        };

        Some(Alert::new(rule, source, severity, message, as_of))
    }
}
