//! Campaign records and the derived values the engine produces from them.
//!
//! RULE: Donations and transactions arrive from the persistence
//! collaborator. Checks, statuses, alerts and spending rows are derived
//! on every evaluation and never stored as the source of truth.

use crate::{
    error::{EcfaError, EcfaResult},
    types::{CampaignId, EntityId, Kes, Timestamp},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ── Enumerations ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonationMethod {
    MobileMoney,
    Bank,
    Cash,
    Cheque,
}

impl DonationMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MobileMoney => "mobile_money",
            Self::Bank => "bank",
            Self::Cash => "cash",
            Self::Cheque => "cheque",
        }
    }
}

impl FromStr for DonationMethod {
    type Err = EcfaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mobile_money" | "mpesa" => Ok(Self::MobileMoney),
            "bank" => Ok(Self::Bank),
            "cash" => Ok(Self::Cash),
            "cheque" => Ok(Self::Cheque),
            other => Err(unknown("donation method", other)),
        }
    }
}

/// Donor identity verification state.
///
/// Lifecycle: `Pending → Verified` or `Pending → Failed`. Both outcomes
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    Verified,
    Pending,
    Failed,
}

impl KycStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Pending => "pending",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Move to `next`, rejecting anything the lifecycle does not allow.
    pub fn transition(self, next: KycStatus, record: &str) -> EcfaResult<KycStatus> {
        if self.is_terminal() || next == Self::Pending {
            return Err(EcfaError::InvalidTransition {
                kind: "KYC status",
                record: record.to_string(),
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        Ok(next)
    }
}

impl FromStr for KycStatus {
    type Err = EcfaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "verified" => Ok(Self::Verified),
            "pending" => Ok(Self::Pending),
            "failed" => Ok(Self::Failed),
            other => Err(unknown("KYC status", other)),
        }
    }
}

/// ECFA expenditure categories. Declaration order is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpendingCategory {
    Advertising,
    Publicity,
    #[serde(rename = "Venue Hire")]
    VenueHire,
    Transport,
    Personnel,
    #[serde(rename = "Admin & Other")]
    AdminAndOther,
}

impl SpendingCategory {
    pub const ALL: [SpendingCategory; 6] = [
        Self::Advertising,
        Self::Publicity,
        Self::VenueHire,
        Self::Transport,
        Self::Personnel,
        Self::AdminAndOther,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Advertising => "Advertising",
            Self::Publicity => "Publicity",
            Self::VenueHire => "Venue Hire",
            Self::Transport => "Transport",
            Self::Personnel => "Personnel",
            Self::AdminAndOther => "Admin & Other",
        }
    }
}

impl fmt::Display for SpendingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SpendingCategory {
    type Err = EcfaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| unknown("spending category", s))
    }
}

/// Expenditure review state.
///
/// Lifecycle: created `Pending`, reviewed once to `Approved` or `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Approved,
    Pending,
    Rejected,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Pending => "pending",
            Self::Rejected => "rejected",
        }
    }

    pub fn review(self, next: TransactionStatus, record: &str) -> EcfaResult<TransactionStatus> {
        match (self, next) {
            (Self::Pending, Self::Approved) | (Self::Pending, Self::Rejected) => Ok(next),
            _ => Err(EcfaError::InvalidTransition {
                kind: "transaction status",
                record: record.to_string(),
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            }),
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = EcfaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Self::Approved),
            "pending" => Ok(Self::Pending),
            "rejected" => Ok(Self::Rejected),
            other => Err(unknown("transaction status", other)),
        }
    }
}

fn unknown(kind: &'static str, value: &str) -> EcfaError {
    log::warn!("rejected unknown {kind}: {value:?}");
    EcfaError::UnknownVariant {
        kind,
        value: value.to_string(),
    }
}

// ── Records ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub id: EntityId,
    pub campaign_id: CampaignId,
    /// Placeholder text is acceptable when `anonymous` is set.
    pub donor_name: String,
    pub phone: String,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
    pub amount: Kes,
    pub method: DonationMethod,
    pub kyc_status: KycStatus,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub receipt_number: Option<String>,
    pub donated_at: Timestamp,
    pub recorded_at: Timestamp,
}

impl Donation {
    /// Name used in alert messages. Identity fields of anonymous donors
    /// are never surfaced.
    pub fn donor_label(&self) -> &str {
        if self.anonymous {
            "unidentified donor"
        } else {
            &self.donor_name
        }
    }

    pub fn has_reference(&self) -> bool {
        self.reference.as_deref().is_some_and(|r| !r.trim().is_empty())
    }

    pub fn has_receipt(&self) -> bool {
        self.receipt_number
            .as_deref()
            .is_some_and(|r| !r.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: EntityId,
    pub campaign_id: CampaignId,
    pub category: SpendingCategory,
    pub amount: Kes,
    pub status: TransactionStatus,
    #[serde(default)]
    pub description: String,
    pub incurred_at: Timestamp,
}

/// Per-category spending ceilings, keyed in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryLimits(BTreeMap<SpendingCategory, Kes>);

impl CategoryLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: SpendingCategory, limit: Kes) -> Self {
        self.0.insert(category, limit);
        self
    }

    pub fn set(&mut self, category: SpendingCategory, limit: Kes) {
        self.0.insert(category, limit);
    }

    /// The configured limit, which must exist and be positive.
    pub fn limit_for(&self, category: SpendingCategory) -> EcfaResult<Kes> {
        let limit = self
            .0
            .get(&category)
            .copied()
            .ok_or_else(|| EcfaError::MissingCategoryLimit {
                category: category.label().to_string(),
            })?;
        if limit <= 0 {
            log::warn!("rejected non-positive limit {limit} for {category}");
            return Err(EcfaError::InvalidLimit {
                scope: category.label().to_string(),
                limit,
            });
        }
        Ok(limit)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpendingCategory, Kes)> + '_ {
        self.0.iter().map(|(c, l)| (*c, *l))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub spending_limit: Kes,
    pub category_limits: CategoryLimits,
}

// ── Derived values ───────────────────────────────────────────────────────────

/// Compliance areas used for the score breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplianceCategory {
    Financial,
    Donor,
    Documentation,
    Personnel,
    Reporting,
}

impl ComplianceCategory {
    pub const ALL: [ComplianceCategory; 5] = [
        Self::Financial,
        Self::Donor,
        Self::Documentation,
        Self::Personnel,
        Self::Reporting,
    ];
}

/// Stable rule codes. They prefix alert ids, so never rename one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceRule {
    AnonymousThreshold,
    IndividualLimit,
    KycVerification,
    /// Alert-only rule: never produces a check.
    HighValueWatch,
    PaymentReference,
    DonorContact,
    ReceiptIssued,
    OverallSpendingLimit,
    CategorySpendingLimit,
    ExpenditureReview,
    DonationReceipts,
    /// Alert-only rule: the all-clear for a fully compliant donor book.
    CampaignCompliance,
}

impl ComplianceRule {
    pub fn code(self) -> &'static str {
        match self {
            Self::AnonymousThreshold => "anonymous_threshold",
            Self::IndividualLimit => "individual_limit",
            Self::KycVerification => "kyc_verification",
            Self::HighValueWatch => "high_value_watch",
            Self::PaymentReference => "payment_reference",
            Self::DonorContact => "donor_contact",
            Self::ReceiptIssued => "receipt_issued",
            Self::OverallSpendingLimit => "overall_spending_limit",
            Self::CategorySpendingLimit => "category_spending_limit",
            Self::ExpenditureReview => "expenditure_review",
            Self::DonationReceipts => "donation_receipts",
            Self::CampaignCompliance => "campaign_compliance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceCheck {
    pub rule: ComplianceRule,
    pub label: String,
    pub description: String,
    pub category: ComplianceCategory,
    /// Id of the donation, category or campaign the check was run against.
    pub subject: String,
    pub passed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    Flagged,
    Violation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
    Success,
}

impl AlertSeverity {
    /// Display precedence: lower sorts first.
    pub fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::Warning => 1,
            Self::Info => 2,
            Self::Success => 3,
        }
    }
}

/// Where an alert came from, for click-through to the source record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlertSource {
    Donation { donation_id: EntityId },
    Category { category: SpendingCategory },
    Campaign { campaign_id: CampaignId },
}

impl AlertSource {
    fn key(&self) -> String {
        match self {
            Self::Donation { donation_id } => format!("donation:{donation_id}"),
            Self::Category { category } => format!("category:{}", category.label()),
            Self::Campaign { campaign_id } => format!("campaign:{campaign_id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// `<rule code>/<source key>`; identical across re-evaluations.
    pub id: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub timestamp: Timestamp,
    pub resolved: bool,
    pub source: AlertSource,
}

impl Alert {
    pub fn new(
        rule: ComplianceRule,
        source: AlertSource,
        severity: AlertSeverity,
        message: String,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: format!("{}/{}", rule.code(), source.key()),
            severity,
            message,
            timestamp,
            resolved: false,
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpending {
    pub category: SpendingCategory,
    pub spent: Kes,
    pub limit: Kes,
    /// Unclamped; values above 100 are kept for alerting.
    pub percentage: f64,
}

impl CategorySpending {
    /// Percentage clamped to 100 for progress bars.
    pub fn display_percentage(&self) -> f64 {
        self.percentage.min(100.0)
    }

    pub fn remaining(&self) -> Kes {
        (self.limit - self.spent).max(0)
    }
}
