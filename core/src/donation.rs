//! Per-donation ECFA rules.
//!
//! Each rule is an independent check; order only affects display.
//!   1. Anonymous threshold      (hard)
//!   2. Individual limit         (hard)
//!   3. KYC verification         (soft, anonymous donors exempt)
//!   4. High-value watch         (alert only, no check)
//!   5. Payment reference        (soft, cash exempt)
//!   6. Donor contact            (soft, anonymous donors exempt)
//!   7. Receipt issued           (soft)
//!
//! A failed hard rule makes the donation a violation. A failed soft rule
//! with no hard failure flags it.

use crate::{
    config::ThresholdConfig,
    error::{EcfaError, EcfaResult},
    model::{
        Alert, AlertSeverity, AlertSource, ComplianceCategory, ComplianceCheck, ComplianceRule,
        ComplianceStatus, Donation, DonationMethod, KycStatus,
    },
    types::format_kes,
};
use serde::{Deserialize, Serialize};

/// Where a donor stands in the KYC lifecycle for compliance purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycPosition {
    /// Anonymous donors are not identity-verified.
    Exempt,
    AwaitingVerification,
    Verified,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationEvaluation {
    pub donation_id: String,
    pub kyc: KycPosition,
    pub checks: Vec<ComplianceCheck>,
    pub status: ComplianceStatus,
    pub alerts: Vec<Alert>,
}

impl DonationEvaluation {
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }
}

pub struct DonationComplianceEvaluator<'a> {
    config: &'a ThresholdConfig,
}

impl<'a> DonationComplianceEvaluator<'a> {
    pub fn new(config: &'a ThresholdConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, donation: &Donation) -> EcfaResult<DonationEvaluation> {
        if donation.amount <= 0 {
            log::warn!(
                "rejected donation {} with amount {}",
                donation.id,
                donation.amount
            );
            return Err(EcfaError::InvalidAmount {
                record: format!("donation {}", donation.id),
                amount: donation.amount,
            });
        }

        let cfg = self.config;
        let source = AlertSource::Donation {
            donation_id: donation.id.clone(),
        };
        let mut checks = Vec::with_capacity(6);
        let mut alerts = Vec::new();

        // 1. Anonymous threshold
        let anonymous_ok = !(donation.anonymous && donation.amount > cfg.anonymous_threshold);
        checks.push(self.check(
            donation,
            ComplianceRule::AnonymousThreshold,
            "Anonymous donation threshold",
            format!(
                "Anonymous donations must not exceed {}",
                format_kes(cfg.anonymous_threshold)
            ),
            ComplianceCategory::Donor,
            anonymous_ok,
        ));
        if !anonymous_ok {
            alerts.push(Alert::new(
                ComplianceRule::AnonymousThreshold,
                source.clone(),
                AlertSeverity::Critical,
                format!(
                    "Anonymous donation of {} exceeds {} ECFA threshold.",
                    format_kes(donation.amount),
                    format_kes(cfg.anonymous_threshold)
                ),
                donation.recorded_at,
            ));
        }

        // 2. Individual limit
        let individual_ok = donation.amount <= cfg.individual_limit;
        checks.push(self.check(
            donation,
            ComplianceRule::IndividualLimit,
            "Individual contribution limit",
            format!(
                "A single contributor may give at most {}",
                format_kes(cfg.individual_limit)
            ),
            ComplianceCategory::Financial,
            individual_ok,
        ));
        if !individual_ok {
            alerts.push(Alert::new(
                ComplianceRule::IndividualLimit,
                source.clone(),
                AlertSeverity::Critical,
                format!(
                    "Donation from {} of {} exceeds the {} individual contribution limit.",
                    donation.donor_label(),
                    format_kes(donation.amount),
                    format_kes(cfg.individual_limit)
                ),
                donation.recorded_at,
            ));
        }

        // 3. KYC verification
        let kyc = kyc_position(donation);
        let kyc_ok = matches!(kyc, KycPosition::Exempt | KycPosition::Verified);
        checks.push(self.check(
            donation,
            ComplianceRule::KycVerification,
            "Donor KYC verified",
            "Identified donors must pass identity verification".to_string(),
            ComplianceCategory::Donor,
            kyc_ok,
        ));
        match kyc {
            KycPosition::AwaitingVerification => alerts.push(Alert::new(
                ComplianceRule::KycVerification,
                source.clone(),
                AlertSeverity::Warning,
                format!(
                    "KYC verification pending for {} ({}).",
                    donation.donor_label(),
                    format_kes(donation.amount)
                ),
                donation.recorded_at,
            )),
            KycPosition::Failed => alerts.push(Alert::new(
                ComplianceRule::KycVerification,
                source.clone(),
                AlertSeverity::Warning,
                format!(
                    "KYC verification failed for {} ({}); hold funds until resolved.",
                    donation.donor_label(),
                    format_kes(donation.amount)
                ),
                donation.recorded_at,
            )),
            KycPosition::Exempt | KycPosition::Verified => {}
        }

        // 4. High-value watch (alert only)
        if self.approaching_high_value(donation.amount) {
            alerts.push(Alert::new(
                ComplianceRule::HighValueWatch,
                source.clone(),
                AlertSeverity::Warning,
                format!(
                    "Donation of {} from {} is approaching the {} high-value threshold.",
                    format_kes(donation.amount),
                    donation.donor_label(),
                    format_kes(cfg.high_value_threshold)
                ),
                donation.recorded_at,
            ));
        }

        // 5. Payment reference
        let reference_ok = donation.method == DonationMethod::Cash || donation.has_reference();
        checks.push(self.check(
            donation,
            ComplianceRule::PaymentReference,
            "Payment reference recorded",
            "Non-cash donations must carry a payment reference".to_string(),
            ComplianceCategory::Documentation,
            reference_ok,
        ));

        // 6. Donor contact
        let contact_ok = donation.anonymous || cfg.phone_format.matches(&donation.phone);
        checks.push(self.check(
            donation,
            ComplianceRule::DonorContact,
            "Donor contact valid",
            "Identified donors must have a valid national mobile number".to_string(),
            ComplianceCategory::Donor,
            contact_ok,
        ));

        // 7. Receipt issued
        checks.push(self.check(
            donation,
            ComplianceRule::ReceiptIssued,
            "Receipt issued",
            "Every donation must be receipted".to_string(),
            ComplianceCategory::Documentation,
            donation.has_receipt(),
        ));

        let status = derive_status(&checks);
        log::debug!(
            "donation {}: {:?}, {} checks, {} alerts",
            donation.id,
            status,
            checks.len(),
            alerts.len()
        );

        Ok(DonationEvaluation {
            donation_id: donation.id.clone(),
            kyc,
            checks,
            status,
            alerts,
        })
    }

    fn approaching_high_value(&self, amount: i64) -> bool {
        let threshold = i128::from(self.config.high_value_threshold);
        let watch_from = threshold * i128::from(self.config.high_value_watch_pct);
        let amount = i128::from(amount);
        amount * 100 >= watch_from && amount < threshold
    }

    fn check(
        &self,
        donation: &Donation,
        rule: ComplianceRule,
        label: &str,
        description: String,
        category: ComplianceCategory,
        passed: bool,
    ) -> ComplianceCheck {
        ComplianceCheck {
            rule,
            label: label.to_string(),
            description,
            category,
            subject: donation.id.clone(),
            passed,
        }
    }
}

/// Convenience wrapper for one-off calls.
pub fn evaluate_donation(
    donation: &Donation,
    config: &ThresholdConfig,
) -> EcfaResult<DonationEvaluation> {
    DonationComplianceEvaluator::new(config).evaluate(donation)
}

fn kyc_position(donation: &Donation) -> KycPosition {
    if donation.anonymous {
        return KycPosition::Exempt;
    }
    match donation.kyc_status {
        KycStatus::Verified => KycPosition::Verified,
        KycStatus::Pending => KycPosition::AwaitingVerification,
        KycStatus::Failed => KycPosition::Failed,
    }
}

fn derive_status(checks: &[ComplianceCheck]) -> ComplianceStatus {
    let failed = |rule: ComplianceRule| checks.iter().any(|c| c.rule == rule && !c.passed);
    if failed(ComplianceRule::AnonymousThreshold) || failed(ComplianceRule::IndividualLimit) {
        ComplianceStatus::Violation
    } else if checks.iter().any(|c| !c.passed) {
        ComplianceStatus::Flagged
    } else {
        ComplianceStatus::Compliant
    }
}
