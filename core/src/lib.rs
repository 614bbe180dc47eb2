//! ECFA compliance evaluation engine.
//!
//! Decides whether campaign donations and expenditures comply with
//! Kenya's Election Campaign Financing Act, and rolls a campaign's
//! records up into category spending, a compliance score and ranked
//! alerts.
//!
//! Everything outside `store` is pure: no I/O, no shared state, and
//! the same input always produces the same output.

pub mod alerts;
pub mod config;
pub mod donation;
pub mod error;
pub mod model;
pub mod monitor;
pub mod report;
pub mod score;
pub mod source;
pub mod spending;
pub mod store;
pub mod types;

pub use alerts::AlertRanker;
pub use config::ThresholdConfig;
pub use donation::{evaluate_donation, DonationComplianceEvaluator, DonationEvaluation};
pub use error::{EcfaError, EcfaResult};
pub use monitor::{LimitSeverity, LimitUtilization, SpendingLimitMonitor};
pub use report::{evaluate_campaign, CampaignSnapshot, ComplianceReport};
pub use score::ComplianceScoreCalculator;
pub use source::{CampaignSource, FixtureSource};
pub use spending::TransactionCategoryAggregator;
pub use store::CampaignStore;
