//! SQLite campaign store tests.
//!
//! Verifies that:
//!   - An imported snapshot reads back unchanged and evaluates identically
//!   - A failed import leaves nothing behind and can be retried
//!   - New donations get a UUID when recorded without an id
//!   - KYC and expenditure lifecycles are enforced on update
//!   - Alert resolutions persist and survive re-derivation

mod common;

use chrono::{TimeZone, Utc};
use common::{clean_donation, demo_snapshot, txn, CAMPAIGN};
use ecfa_core::{
    evaluate_campaign,
    model::{KycStatus, SpendingCategory, TransactionStatus},
    CampaignSource, CampaignStore, EcfaError, ThresholdConfig,
};

fn store() -> CampaignStore {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = CampaignStore::in_memory().expect("open in-memory store");
    store.migrate().expect("migrate");
    store
}

fn store_with_test_campaign() -> CampaignStore {
    let store = store();
    let campaign = ThresholdConfig::ecfa_default().campaign(CAMPAIGN, "Test Campaign");
    store.insert_campaign(&campaign).unwrap();
    store
}

#[test]
fn imported_snapshot_reads_back_unchanged() {
    let store = store();
    let snapshot = demo_snapshot();
    store.import_snapshot(&snapshot).unwrap();

    let loaded = store.snapshot("cmp-nairobi-2027").unwrap();
    assert_eq!(loaded, snapshot);

    let config = ThresholdConfig::ecfa_default();
    let as_of = Utc.with_ymd_and_hms(2027, 3, 10, 0, 0, 0).unwrap();
    assert_eq!(
        evaluate_campaign(&loaded, &config, as_of).unwrap(),
        evaluate_campaign(&snapshot, &config, as_of).unwrap()
    );
}

#[test]
fn unknown_campaign_is_reported() {
    let err = store().fetch_campaign("nope").unwrap_err();
    assert!(matches!(err, EcfaError::CampaignNotFound { .. }), "{err}");
}

#[test]
fn recorded_donation_gets_uuid() {
    let store = store_with_test_campaign();
    let mut donation = clean_donation("", 30_000);
    donation.kyc_status = KycStatus::Pending;

    let id = store.record_donation(&donation).unwrap();
    assert!(uuid::Uuid::parse_str(&id).is_ok(), "not a uuid: {id}");

    let stored = store.fetch_donations(CAMPAIGN).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, id);
    assert_eq!(stored[0].amount, 30_000);
}

#[test]
fn recording_a_non_positive_donation_fails() {
    let store = store_with_test_campaign();
    let err = store.record_donation(&clean_donation("d0", 0)).unwrap_err();
    assert!(matches!(err, EcfaError::InvalidAmount { .. }));
    assert!(store.fetch_donations(CAMPAIGN).unwrap().is_empty());
}

#[test]
fn kyc_lifecycle_is_enforced() {
    let store = store_with_test_campaign();
    let mut donation = clean_donation("d1", 30_000);
    donation.kyc_status = KycStatus::Pending;
    store.record_donation(&donation).unwrap();

    store.update_kyc_status("d1", KycStatus::Verified).unwrap();
    assert_eq!(
        store.fetch_donations(CAMPAIGN).unwrap()[0].kyc_status,
        KycStatus::Verified
    );

    let err = store.update_kyc_status("d1", KycStatus::Failed).unwrap_err();
    assert!(matches!(err, EcfaError::InvalidTransition { .. }), "{err}");
    let err = store
        .update_kyc_status("missing", KycStatus::Verified)
        .unwrap_err();
    assert!(
        matches!(err, EcfaError::RecordNotFound { kind: "donation", .. }),
        "{err}"
    );
}

#[test]
fn expenditures_start_pending_and_are_reviewed_once() {
    let store = store_with_test_campaign();

    let approved = txn("t0", SpendingCategory::Transport, 1_000, TransactionStatus::Approved);
    assert!(matches!(
        store.record_transaction(&approved).unwrap_err(),
        EcfaError::InvalidTransition { .. }
    ));

    let pending = txn("", SpendingCategory::Transport, 1_000, TransactionStatus::Pending);
    let id = store.record_transaction(&pending).unwrap();
    store.review_transaction(&id, TransactionStatus::Approved).unwrap();

    let stored = store.fetch_transactions(CAMPAIGN).unwrap();
    assert_eq!(stored[0].status, TransactionStatus::Approved);

    let err = store
        .review_transaction(&id, TransactionStatus::Rejected)
        .unwrap_err();
    assert!(matches!(err, EcfaError::InvalidTransition { .. }), "{err}");

    let err = store
        .review_transaction("missing", TransactionStatus::Approved)
        .unwrap_err();
    assert!(
        matches!(err, EcfaError::RecordNotFound { kind: "transaction", .. }),
        "{err}"
    );
}

/// A duplicate donation id fails the import; the campaign row and the
/// donations written before it are rolled back, so a corrected import
/// succeeds afterwards.
#[test]
fn failed_import_rolls_back_and_can_be_retried() {
    let store = store();
    let mut broken = demo_snapshot();
    let duplicate = broken.donations[0].clone();
    broken.donations.push(duplicate);

    let err = store.import_snapshot(&broken).unwrap_err();
    assert!(matches!(err, EcfaError::Database(_)), "{err}");

    let err = store.fetch_campaign("cmp-nairobi-2027").unwrap_err();
    assert!(
        matches!(err, EcfaError::CampaignNotFound { .. }),
        "campaign row survived a failed import: {err}"
    );
    assert!(store.fetch_donations("cmp-nairobi-2027").unwrap().is_empty());

    let snapshot = demo_snapshot();
    store.import_snapshot(&snapshot).unwrap();
    assert_eq!(store.snapshot("cmp-nairobi-2027").unwrap(), snapshot);
}

#[test]
fn alert_resolutions_persist() {
    let store = store();
    let snapshot = demo_snapshot();
    store.import_snapshot(&snapshot).unwrap();
    let campaign_id = snapshot.campaign.id.as_str();
    let alert_id = "kyc_verification/donation:don-003";

    store.set_alert_resolved(campaign_id, alert_id, true).unwrap();
    store.set_alert_resolved(campaign_id, alert_id, true).unwrap();
    let resolved = store.resolved_alert_ids(campaign_id).unwrap();
    assert_eq!(resolved.len(), 1);

    let as_of = Utc.with_ymd_and_hms(2027, 3, 10, 0, 0, 0).unwrap();
    let report = evaluate_campaign(&snapshot, &ThresholdConfig::ecfa_default(), as_of)
        .unwrap()
        .apply_resolutions(&resolved);
    let alert = report.alerts.iter().find(|a| a.id == alert_id).unwrap();
    assert!(alert.resolved);

    store.set_alert_resolved(campaign_id, alert_id, false).unwrap();
    assert!(store.resolved_alert_ids(campaign_id).unwrap().is_empty());
}
