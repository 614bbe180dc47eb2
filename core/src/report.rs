//! Campaign-wide compliance report.
//!
//! RULE: The report is a pure function of (snapshot, config, as_of).
//! Callers re-derive it on every data refresh instead of patching it.
//!
//! Pipeline:
//!   1. Evaluate every donation
//!   2. Aggregate approved spend per category
//!   3. Monitor the overall limit and each category limit
//!   4. Add campaign-level checks
//!   5. Score checks, rank alerts

use crate::{
    alerts::AlertRanker,
    config::ThresholdConfig,
    donation::{DonationComplianceEvaluator, KycPosition},
    error::EcfaResult,
    model::{
        Alert, AlertSeverity, AlertSource, Campaign, CategorySpending, ComplianceCategory,
        ComplianceCheck, ComplianceRule, ComplianceStatus, Donation, SpendingCategory,
        Transaction, TransactionStatus,
    },
    monitor::{LimitSeverity, LimitUtilization, SpendingLimitMonitor},
    score::{CategoryScore, ComplianceScoreCalculator},
    spending::TransactionCategoryAggregator,
    types::{checked_total, format_kes, CampaignId, EntityId, Kes, Timestamp},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Everything the persistence collaborator hands over for one campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSnapshot {
    pub campaign: Campaign,
    #[serde(default)]
    pub donations: Vec<Donation>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationStatus {
    pub donation_id: EntityId,
    pub status: ComplianceStatus,
    pub kyc: KycPosition,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationSummary {
    pub total_raised: Kes,
    pub count: usize,
    pub compliant: usize,
    pub flagged: usize,
    pub violation: usize,
    pub pending_kyc: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingSummary {
    pub total_approved: Kes,
    pub pending_review: usize,
    pub overall: LimitUtilization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub campaign_id: CampaignId,
    pub generated_at: Timestamp,
    pub checks: Vec<ComplianceCheck>,
    /// Ranked for display.
    pub alerts: Vec<Alert>,
    pub score: u32,
    pub category_breakdown: Vec<CategoryScore>,
    pub category_spending: Vec<CategorySpending>,
    pub donation_statuses: Vec<DonationStatus>,
    pub donations: DonationSummary,
    pub spending: SpendingSummary,
}

impl ComplianceReport {
    /// Carry externally resolved alerts over to a freshly derived report.
    pub fn apply_resolutions(mut self, resolved_ids: &HashSet<String>) -> Self {
        for alert in &mut self.alerts {
            if resolved_ids.contains(&alert.id) {
                alert.resolved = true;
            }
        }
        self.alerts = AlertRanker::rank(self.alerts);
        self
    }

    pub fn unresolved_alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| !a.resolved)
    }

    pub fn status_of(&self, donation_id: &str) -> Option<ComplianceStatus> {
        self.donation_statuses
            .iter()
            .find(|d| d.donation_id == donation_id)
            .map(|d| d.status)
    }
}

pub fn evaluate_campaign(
    snapshot: &CampaignSnapshot,
    config: &ThresholdConfig,
    as_of: Timestamp,
) -> EcfaResult<ComplianceReport> {
    config.validate()?;
    let campaign = &snapshot.campaign;
    let evaluator = DonationComplianceEvaluator::new(config);
    let monitor = SpendingLimitMonitor::new(config);

    let mut checks = Vec::new();
    let mut alerts = Vec::new();
    let mut donation_statuses = Vec::with_capacity(snapshot.donations.len());
    let mut donations = DonationSummary::default();

    // 1. Donations
    for donation in &snapshot.donations {
        let evaluation = evaluator.evaluate(donation)?;
        donations.total_raised =
            checked_total([donations.total_raised, donation.amount], "donations raised")?;
        donations.count += 1;
        match evaluation.status {
            ComplianceStatus::Compliant => donations.compliant += 1,
            ComplianceStatus::Flagged => donations.flagged += 1,
            ComplianceStatus::Violation => donations.violation += 1,
        }
        if evaluation.kyc == KycPosition::AwaitingVerification {
            donations.pending_kyc += 1;
        }
        donation_statuses.push(DonationStatus {
            donation_id: evaluation.donation_id,
            status: evaluation.status,
            kyc: evaluation.kyc,
        });
        checks.extend(evaluation.checks);
        alerts.extend(evaluation.alerts);
    }

    // 2. Category spend
    let category_spending =
        TransactionCategoryAggregator::aggregate(&snapshot.transactions, &campaign.category_limits)?;
    let total_approved = TransactionCategoryAggregator::total_approved(&snapshot.transactions)?;

    // 3. Limits
    let overall = monitor.evaluate(total_approved, campaign.spending_limit, "overall")?;
    checks.push(ComplianceCheck {
        rule: ComplianceRule::OverallSpendingLimit,
        label: "Overall spending limit".to_string(),
        description: format!(
            "Approved spend must stay below {}% of the {} campaign limit",
            config.spending_bands.fail_pct,
            format_kes(campaign.spending_limit)
        ),
        category: ComplianceCategory::Financial,
        subject: campaign.id.clone(),
        passed: overall.severity != LimitSeverity::Fail,
    });
    alerts.extend(monitor.alert(
        &overall,
        ComplianceRule::OverallSpendingLimit,
        AlertSource::Campaign {
            campaign_id: campaign.id.clone(),
        },
        "Campaign",
        as_of,
    ));

    for row in &category_spending {
        let usage = monitor.evaluate(row.spent, row.limit, row.category.label())?;
        checks.push(ComplianceCheck {
            rule: ComplianceRule::CategorySpendingLimit,
            label: format!("{} spending limit", row.category),
            description: format!(
                "{} spend must stay below {}% of {}",
                row.category,
                config.spending_bands.fail_pct,
                format_kes(row.limit)
            ),
            category: match row.category {
                SpendingCategory::Personnel => ComplianceCategory::Personnel,
                _ => ComplianceCategory::Financial,
            },
            subject: row.category.label().to_string(),
            passed: usage.severity != LimitSeverity::Fail,
        });
        alerts.extend(monitor.alert(
            &usage,
            ComplianceRule::CategorySpendingLimit,
            AlertSource::Category {
                category: row.category,
            },
            row.category.label(),
            as_of,
        ));
    }

    // 4. Campaign-level reporting checks
    let pending_review = snapshot
        .transactions
        .iter()
        .filter(|t| t.status == TransactionStatus::Pending)
        .count();
    checks.push(ComplianceCheck {
        rule: ComplianceRule::ExpenditureReview,
        label: "Expenditures reviewed".to_string(),
        description: format!("{pending_review} expenditure(s) awaiting review"),
        category: ComplianceCategory::Reporting,
        subject: campaign.id.clone(),
        passed: pending_review == 0,
    });

    let unreceipted = snapshot.donations.iter().filter(|d| !d.has_receipt()).count();
    checks.push(ComplianceCheck {
        rule: ComplianceRule::DonationReceipts,
        label: "Donation receipts complete".to_string(),
        description: format!("{unreceipted} donation(s) without a receipt"),
        category: ComplianceCategory::Reporting,
        subject: campaign.id.clone(),
        passed: unreceipted == 0,
    });

    if donations.count > 0 && donations.compliant == donations.count {
        alerts.push(Alert::new(
            ComplianceRule::CampaignCompliance,
            AlertSource::Campaign {
                campaign_id: campaign.id.clone(),
            },
            AlertSeverity::Success,
            format!("All {} donations are ECFA compliant.", donations.count),
            as_of,
        ));
    }

    // 5. Score and rank
    let score = ComplianceScoreCalculator::score(&checks);
    let category_breakdown = ComplianceScoreCalculator::breakdown(&checks);
    let alerts = AlertRanker::rank(alerts);

    log::debug!(
        "campaign {}: score {score}, {} checks, {} alerts",
        campaign.id,
        checks.len(),
        alerts.len()
    );

    Ok(ComplianceReport {
        campaign_id: campaign.id.clone(),
        generated_at: as_of,
        checks,
        alerts,
        score,
        category_breakdown,
        category_spending,
        donation_statuses,
        donations,
        spending: SpendingSummary {
            total_approved,
            pending_review,
            overall,
        },
    })
}
