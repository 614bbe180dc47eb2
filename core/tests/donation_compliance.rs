//! Donation rule tests.
//!
//! Verifies that:
//!   - A clean donation is compliant with six passing checks and no alerts
//!   - Anonymous donations over the threshold are violations with one critical alert
//!   - Donations over the individual limit are violations regardless of KYC or anonymity
//!   - KYC failures alone only flag a donation; anonymous donors are exempt
//!   - The high-value watch raises an alert without touching status or checks
//!   - Reference, contact and receipt rules flag, with their exemptions
//!   - Non-positive amounts are rejected

mod common;

use common::{anonymous_donation, clean_donation};
use ecfa_core::{
    donation::KycPosition,
    evaluate_donation,
    model::{AlertSeverity, ComplianceRule, ComplianceStatus, DonationMethod, KycStatus},
    DonationComplianceEvaluator, EcfaError, ThresholdConfig,
};

fn config() -> ThresholdConfig {
    ThresholdConfig::ecfa_default()
}

fn failed_rules(eval: &ecfa_core::DonationEvaluation) -> Vec<ComplianceRule> {
    eval.checks.iter().filter(|c| !c.passed).map(|c| c.rule).collect()
}

#[test]
fn clean_donation_is_compliant() {
    let eval = evaluate_donation(&clean_donation("d1", 10_000), &config()).unwrap();

    assert_eq!(eval.status, ComplianceStatus::Compliant);
    assert_eq!(eval.kyc, KycPosition::Verified);
    assert_eq!(eval.checks.len(), 6, "high-value watch never adds a check");
    assert_eq!(eval.passed_count(), 6);
    assert!(eval.alerts.is_empty(), "unexpected alerts: {:?}", eval.alerts);
}

/// Anonymous KES 8,000 against a KES 5,000 threshold.
#[test]
fn anonymous_over_threshold_is_violation() {
    let eval = evaluate_donation(&anonymous_donation("d2", 8_000), &config()).unwrap();

    assert_eq!(eval.status, ComplianceStatus::Violation);
    assert_eq!(failed_rules(&eval), vec![ComplianceRule::AnonymousThreshold]);

    let critical: Vec<_> = eval
        .alerts
        .iter()
        .filter(|a| a.severity == AlertSeverity::Critical)
        .collect();
    assert_eq!(critical.len(), 1, "alerts: {:?}", eval.alerts);
    assert!(critical[0].message.contains("Anonymous"));
    assert!(critical[0].message.contains("8,000"), "{}", critical[0].message);
    assert!(critical[0].message.contains("5,000"), "{}", critical[0].message);
}

#[test]
fn anonymous_alert_uses_configured_threshold() {
    let mut cfg = config();
    cfg.anonymous_threshold = 2_500;
    let eval = evaluate_donation(&anonymous_donation("d2", 3_000), &cfg).unwrap();

    assert_eq!(eval.status, ComplianceStatus::Violation);
    assert!(eval.alerts[0].message.contains("3,000"));
    assert!(eval.alerts[0].message.contains("2,500"));
}

#[test]
fn anonymous_within_threshold_is_compliant_without_national_id() {
    let donation = anonymous_donation("d3", 5_000);
    assert!(donation.national_id.is_none());

    let eval = evaluate_donation(&donation, &config()).unwrap();
    assert_eq!(eval.status, ComplianceStatus::Compliant);
    assert_eq!(eval.kyc, KycPosition::Exempt);
    assert!(eval.alerts.is_empty());
}

#[test]
fn anonymous_over_both_limits_has_one_anonymous_alert() {
    let eval = evaluate_donation(&anonymous_donation("d4", 3_000_000), &config()).unwrap();

    assert_eq!(eval.status, ComplianceStatus::Violation);
    let mentioning: Vec<_> = eval
        .alerts
        .iter()
        .filter(|a| a.severity == AlertSeverity::Critical && a.message.contains("Anonymous"))
        .collect();
    assert_eq!(mentioning.len(), 1, "alerts: {:?}", eval.alerts);
    assert_eq!(
        failed_rules(&eval),
        vec![ComplianceRule::AnonymousThreshold, ComplianceRule::IndividualLimit]
    );
}

#[test]
fn over_individual_limit_is_violation_regardless_of_kyc_or_anonymity() {
    let cfg = config();
    for anonymous in [false, true] {
        for kyc in [KycStatus::Verified, KycStatus::Pending, KycStatus::Failed] {
            let mut donation = clean_donation("d5", cfg.individual_limit + 1);
            donation.anonymous = anonymous;
            donation.kyc_status = kyc;

            let eval = evaluate_donation(&donation, &cfg).unwrap();
            assert_eq!(
                eval.status,
                ComplianceStatus::Violation,
                "anonymous={anonymous} kyc={kyc:?}"
            );
        }
    }
}

#[test]
fn individual_limit_alert_names_donor_and_values() {
    let eval = evaluate_donation(&clean_donation("d6", 2_500_000), &config()).unwrap();

    let alert = eval
        .alerts
        .iter()
        .find(|a| a.severity == AlertSeverity::Critical)
        .expect("critical alert");
    assert!(alert.message.contains("Wanjiku Kamau"), "{}", alert.message);
    assert!(alert.message.contains("2,500,000"), "{}", alert.message);
    assert!(alert.message.contains("2,000,000"), "{}", alert.message);
    assert_eq!(alert.id, "individual_limit/donation:d6");
}

#[test]
fn amount_at_individual_limit_passes() {
    let mut cfg = config();
    cfg.high_value_threshold = 5_000_000;
    let eval = evaluate_donation(&clean_donation("d7", cfg.individual_limit), &cfg).unwrap();
    assert_eq!(eval.status, ComplianceStatus::Compliant);
}

#[test]
fn kyc_failures_flag_but_never_violate() {
    for kyc in [KycStatus::Pending, KycStatus::Failed] {
        let mut donation = clean_donation("d8", 50_000);
        donation.kyc_status = kyc;

        let eval = evaluate_donation(&donation, &config()).unwrap();
        assert_eq!(eval.status, ComplianceStatus::Flagged, "kyc={kyc:?}");
        assert_eq!(failed_rules(&eval), vec![ComplianceRule::KycVerification]);
        assert_eq!(eval.alerts.len(), 1);
        assert_eq!(eval.alerts[0].severity, AlertSeverity::Warning);
    }
}

#[test]
fn pending_kyc_reports_awaiting_verification() {
    let mut donation = clean_donation("d9", 50_000);
    donation.kyc_status = KycStatus::Pending;

    let eval = evaluate_donation(&donation, &config()).unwrap();
    assert_eq!(eval.kyc, KycPosition::AwaitingVerification);
    assert!(eval.alerts[0].message.contains("pending"));
}

#[test]
fn high_value_watch_alerts_without_affecting_status() {
    let cfg = config();
    let eval = evaluate_donation(&clean_donation("d10", 850_000), &cfg).unwrap();

    assert_eq!(eval.status, ComplianceStatus::Compliant);
    assert_eq!(eval.passed_count(), 6);
    assert_eq!(eval.alerts.len(), 1);
    assert_eq!(eval.alerts[0].severity, AlertSeverity::Warning);
    assert!(eval.alerts[0].message.contains("approaching"));
    assert_eq!(eval.alerts[0].id, "high_value_watch/donation:d10");
}

#[test]
fn high_value_watch_window_is_80_to_100_percent() {
    let cfg = config();
    let watched = |amount| {
        evaluate_donation(&clean_donation("d11", amount), &cfg)
            .unwrap()
            .alerts
            .iter()
            .any(|a| a.message.contains("approaching"))
    };

    assert!(!watched(799_999));
    assert!(watched(800_000));
    assert!(watched(999_999));
    assert!(!watched(1_000_000), "at the threshold it is no longer approaching");
}

#[test]
fn missing_reference_flags_non_cash_only() {
    let cfg = config();

    let mut bank = clean_donation("d12", 20_000);
    bank.method = DonationMethod::Bank;
    bank.reference = Some("   ".to_string());
    let eval = evaluate_donation(&bank, &cfg).unwrap();
    assert_eq!(eval.status, ComplianceStatus::Flagged);
    assert_eq!(failed_rules(&eval), vec![ComplianceRule::PaymentReference]);

    let mut cash = clean_donation("d13", 20_000);
    cash.method = DonationMethod::Cash;
    cash.reference = None;
    let eval = evaluate_donation(&cash, &cfg).unwrap();
    assert_eq!(eval.status, ComplianceStatus::Compliant);
}

#[test]
fn invalid_phone_flags_identified_donor() {
    let mut donation = clean_donation("d14", 20_000);
    donation.phone = "12345".to_string();

    let eval = evaluate_donation(&donation, &config()).unwrap();
    assert_eq!(eval.status, ComplianceStatus::Flagged);
    assert_eq!(failed_rules(&eval), vec![ComplianceRule::DonorContact]);
}

#[test]
fn missing_receipt_flags() {
    let mut donation = clean_donation("d15", 20_000);
    donation.receipt_number = None;

    let eval = evaluate_donation(&donation, &config()).unwrap();
    assert_eq!(eval.status, ComplianceStatus::Flagged);
    assert_eq!(failed_rules(&eval), vec![ComplianceRule::ReceiptIssued]);
}

#[test]
fn non_positive_amounts_are_rejected() {
    let cfg = config();
    let evaluator = DonationComplianceEvaluator::new(&cfg);

    for amount in [0, -5_000] {
        let result = evaluator.evaluate(&clean_donation("d16", amount));
        assert!(
            matches!(result, Err(EcfaError::InvalidAmount { amount: a, .. }) if a == amount),
            "amount {amount} should be rejected"
        );
    }
}

#[test]
fn alerts_carry_the_recorded_timestamp() {
    let donation = anonymous_donation("d17", 9_000);
    let eval = evaluate_donation(&donation, &config()).unwrap();
    assert_eq!(eval.alerts[0].timestamp, donation.recorded_at);
    assert!(!eval.alerts[0].resolved);
}
