//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use ecfa_core::{
    model::{Donation, DonationMethod, KycStatus, SpendingCategory, Transaction, TransactionStatus},
    report::CampaignSnapshot,
    types::Kes,
};

pub const CAMPAIGN: &str = "cmp-test";

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2027, 3, day, hour, 0, 0).unwrap()
}

/// A verified, receipted, referenced donation that passes every rule
/// as long as `amount` stays below the watch and limit thresholds.
pub fn clean_donation(id: &str, amount: Kes) -> Donation {
    Donation {
        id: id.to_string(),
        campaign_id: CAMPAIGN.to_string(),
        donor_name: "Wanjiku Kamau".to_string(),
        phone: "+254712345678".to_string(),
        national_id: Some("28456712".to_string()),
        anonymous: false,
        amount,
        method: DonationMethod::MobileMoney,
        kyc_status: KycStatus::Verified,
        reference: Some(format!("REF-{id}")),
        receipt_number: Some(format!("RCP-{id}")),
        donated_at: at(2, 8),
        recorded_at: at(2, 9),
    }
}

/// Anonymous cash donation with placeholder identity fields.
pub fn anonymous_donation(id: &str, amount: Kes) -> Donation {
    Donation {
        donor_name: "Anonymous".to_string(),
        phone: "N/A".to_string(),
        national_id: None,
        anonymous: true,
        method: DonationMethod::Cash,
        kyc_status: KycStatus::Pending,
        reference: None,
        ..clean_donation(id, amount)
    }
}

pub fn txn(
    id: &str,
    category: SpendingCategory,
    amount: Kes,
    status: TransactionStatus,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        campaign_id: CAMPAIGN.to_string(),
        category,
        amount,
        status,
        description: String::new(),
        incurred_at: at(1, 0),
    }
}

pub fn demo_snapshot() -> CampaignSnapshot {
    serde_json::from_str(include_str!("../../../data/demo_campaign.json"))
        .expect("demo snapshot parses")
}
