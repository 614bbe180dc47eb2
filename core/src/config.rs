//! Statutory thresholds. One immutable `ThresholdConfig` is passed into
//! every evaluator call; nothing reads thresholds from a global.

use crate::{
    error::{EcfaError, EcfaResult},
    model::{Campaign, CategoryLimits, SpendingCategory},
    types::{CampaignId, Kes},
};
use serde::{Deserialize, Serialize};

/// Pass/warning/fail bands for spending utilization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingBands {
    /// Utilization at or above this is a warning.
    pub warning_pct: u32,
    /// Utilization at or above this is a failure.
    pub fail_pct: u32,
}

/// Utilization levels at which a spending alert is raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertTriggers {
    pub info_pct: u32,
    pub warning_pct: u32,
    pub critical_pct: u32,
}

/// National mobile number format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneFormat {
    pub country_code: String,
    pub trunk_prefix: String,
    pub subscriber_digits: usize,
    /// Allowed first digits of the subscriber number.
    pub leading_digits: Vec<char>,
}

impl PhoneFormat {
    /// Accepts `+<cc><subscriber>`, `<cc><subscriber>` or
    /// `<trunk><subscriber>`, ignoring spaces and dashes.
    pub fn matches(&self, phone: &str) -> bool {
        let compact: String = phone
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect();
        let unsigned = compact.strip_prefix('+');
        let subscriber = match unsigned {
            Some(rest) => rest.strip_prefix(self.country_code.as_str()),
            None => compact
                .strip_prefix(self.country_code.as_str())
                .or_else(|| compact.strip_prefix(self.trunk_prefix.as_str())),
        };
        let Some(subscriber) = subscriber else {
            return false;
        };
        subscriber.len() == self.subscriber_digits
            && subscriber.chars().all(|c| c.is_ascii_digit())
            && subscriber
                .chars()
                .next()
                .is_some_and(|c| self.leading_digits.contains(&c))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Largest anonymous donation the Act tolerates.
    pub anonymous_threshold: Kes,
    /// Largest donation from a single contributor.
    pub individual_limit: Kes,
    /// Donations at this level need enhanced review.
    pub high_value_threshold: Kes,
    /// Percentage of `high_value_threshold` that starts the watch alert.
    pub high_value_watch_pct: u32,
    /// Statutory overall spending ceiling.
    pub spending_limit: Kes,
    pub category_limits: CategoryLimits,
    pub spending_bands: SpendingBands,
    pub alert_triggers: AlertTriggers,
    pub phone_format: PhoneFormat,
}

impl ThresholdConfig {
    /// Load from a JSON file and validate.
    /// In tests, use ThresholdConfig::ecfa_default().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: ThresholdConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        log::debug!("loaded thresholds from {path}");
        Ok(config)
    }

    /// Statutory defaults for a presidential-scale campaign.
    pub fn ecfa_default() -> Self {
        Self {
            anonymous_threshold: 5_000,
            individual_limit: 2_000_000,
            high_value_threshold: 1_000_000,
            high_value_watch_pct: 80,
            spending_limit: 433_000_000,
            category_limits: CategoryLimits::new()
                .with(SpendingCategory::Advertising, 120_000_000)
                .with(SpendingCategory::Publicity, 80_000_000)
                .with(SpendingCategory::VenueHire, 45_000_000)
                .with(SpendingCategory::Transport, 30_000_000)
                .with(SpendingCategory::Personnel, 60_000_000)
                .with(SpendingCategory::AdminAndOther, 25_000_000),
            spending_bands: SpendingBands {
                warning_pct: 70,
                fail_pct: 90,
            },
            alert_triggers: AlertTriggers {
                info_pct: 50,
                warning_pct: 80,
                critical_pct: 95,
            },
            phone_format: PhoneFormat {
                country_code: "254".into(),
                trunk_prefix: "0".into(),
                subscriber_digits: 9,
                leading_digits: vec!['7', '1'],
            },
        }
    }

    /// Reject any configuration that would divide by zero or
    /// misorder the severity bands.
    pub fn validate(&self) -> EcfaResult<()> {
        positive("anonymous_threshold", self.anonymous_threshold)?;
        positive("individual_limit", self.individual_limit)?;
        positive("high_value_threshold", self.high_value_threshold)?;
        positive("spending_limit", self.spending_limit)?;
        for category in SpendingCategory::ALL {
            self.category_limits.limit_for(category)?;
        }
        if self.high_value_watch_pct == 0 || self.high_value_watch_pct > 100 {
            return Err(invalid_pct("high_value_watch_pct", self.high_value_watch_pct));
        }
        let bands = &self.spending_bands;
        ascending(&[
            ("spending_bands.warning_pct", bands.warning_pct),
            ("spending_bands.fail_pct", bands.fail_pct),
        ])?;
        let triggers = &self.alert_triggers;
        ascending(&[
            ("alert_triggers.info_pct", triggers.info_pct),
            ("alert_triggers.warning_pct", triggers.warning_pct),
            ("alert_triggers.critical_pct", triggers.critical_pct),
        ])
    }

    /// A campaign carrying the statutory limits.
    pub fn campaign(&self, id: impl Into<CampaignId>, name: impl Into<String>) -> Campaign {
        Campaign {
            id: id.into(),
            name: name.into(),
            spending_limit: self.spending_limit,
            category_limits: self.category_limits.clone(),
        }
    }
}

fn positive(scope: &str, limit: Kes) -> EcfaResult<()> {
    if limit <= 0 {
        return Err(EcfaError::InvalidLimit {
            scope: scope.to_string(),
            limit,
        });
    }
    Ok(())
}

/// Percentages must be non-zero and strictly increasing. The error names
/// the first field out of order.
fn ascending(fields: &[(&str, u32)]) -> EcfaResult<()> {
    let mut previous = 0;
    for &(scope, pct) in fields {
        if pct <= previous {
            return Err(invalid_pct(scope, pct));
        }
        previous = pct;
    }
    Ok(())
}

fn invalid_pct(scope: &str, pct: u32) -> EcfaError {
    EcfaError::InvalidLimit {
        scope: scope.to_string(),
        limit: i64::from(pct),
    }
}
