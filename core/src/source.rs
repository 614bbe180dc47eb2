//! The persistence collaborator boundary.
//!
//! RULE: The engine never fetches. Callers pull a complete snapshot
//! through a `CampaignSource`, then hand it to `report::evaluate_campaign`.

use crate::{
    error::{EcfaError, EcfaResult},
    model::{Campaign, Donation, Transaction},
    report::CampaignSnapshot,
};
use std::collections::HashMap;

pub trait CampaignSource {
    fn fetch_campaign(&self, campaign_id: &str) -> EcfaResult<Campaign>;

    fn fetch_donations(&self, campaign_id: &str) -> EcfaResult<Vec<Donation>>;

    fn fetch_transactions(&self, campaign_id: &str) -> EcfaResult<Vec<Transaction>>;

    fn snapshot(&self, campaign_id: &str) -> EcfaResult<CampaignSnapshot> {
        Ok(CampaignSnapshot {
            campaign: self.fetch_campaign(campaign_id)?,
            donations: self.fetch_donations(campaign_id)?,
            transactions: self.fetch_transactions(campaign_id)?,
        })
    }
}

/// In-memory source over fixed snapshots, for tests and JSON fixtures.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    snapshots: HashMap<String, CampaignSnapshot>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(mut self, snapshot: CampaignSnapshot) -> Self {
        self.insert(snapshot);
        self
    }

    pub fn insert(&mut self, snapshot: CampaignSnapshot) {
        self.snapshots
            .insert(snapshot.campaign.id.clone(), snapshot);
    }

    /// Parse a JSON-encoded `CampaignSnapshot`.
    pub fn from_json(json: &str) -> EcfaResult<Self> {
        let snapshot: CampaignSnapshot = serde_json::from_str(json)?;
        Ok(Self::new().with_snapshot(snapshot))
    }

    fn get(&self, campaign_id: &str) -> EcfaResult<&CampaignSnapshot> {
        self.snapshots
            .get(campaign_id)
            .ok_or_else(|| EcfaError::CampaignNotFound {
                campaign_id: campaign_id.to_string(),
            })
    }
}

impl CampaignSource for FixtureSource {
    fn fetch_campaign(&self, campaign_id: &str) -> EcfaResult<Campaign> {
        Ok(self.get(campaign_id)?.campaign.clone())
    }

    fn fetch_donations(&self, campaign_id: &str) -> EcfaResult<Vec<Donation>> {
        Ok(self.get(campaign_id)?.donations.clone())
    }

    fn fetch_transactions(&self, campaign_id: &str) -> EcfaResult<Vec<Transaction>> {
        Ok(self.get(campaign_id)?.transactions.clone())
    }
}
