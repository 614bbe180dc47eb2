//! ecfa-report: headless compliance report runner.
//!
//! Usage:
//!   ecfa-report --snapshot data/demo_campaign.json
//!   ecfa-report --snapshot data/demo_campaign.json --db campaign.db --import
//!   ecfa-report --db campaign.db --campaign cmp-nairobi-2027 --json
//!
//! Optional: --config <thresholds.json>, --as-of <RFC 3339 timestamp>

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use ecfa_core::{
    evaluate_campaign, report::CampaignSnapshot, types::format_kes, CampaignSource,
    CampaignStore, ComplianceReport, ThresholdConfig,
};
use std::env;
use std::fs;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let snapshot_path = flag_value(&args, "--snapshot");
    let db = flag_value(&args, "--db");
    let campaign_arg = flag_value(&args, "--campaign");
    let config_path = flag_value(&args, "--config");
    let as_of_arg = flag_value(&args, "--as-of");
    let import = args.iter().any(|a| a == "--import");
    let json = args.iter().any(|a| a == "--json");

    let config = match config_path {
        Some(path) => ThresholdConfig::load(path)?,
        None => ThresholdConfig::ecfa_default(),
    };
    let as_of = match as_of_arg {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("--as-of must be RFC 3339, got {raw}"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let store = match db {
        Some(path) => {
            let store = CampaignStore::open(path)?;
            store.migrate()?;
            Some(store)
        }
        None => None,
    };

    let snapshot = match (snapshot_path, &store) {
        (Some(path), _) => {
            let content =
                fs::read_to_string(path).with_context(|| format!("Cannot read {path}"))?;
            let snapshot: CampaignSnapshot = serde_json::from_str(&content)
                .with_context(|| format!("Cannot parse {path}"))?;
            if import {
                let Some(store) = &store else {
                    bail!("--import needs --db");
                };
                store.import_snapshot(&snapshot)?;
            }
            snapshot
        }
        (None, Some(store)) => {
            let Some(campaign_id) = campaign_arg else {
                bail!("--db without --snapshot needs --campaign");
            };
            store.snapshot(campaign_id)?
        }
        (None, None) => bail!("nothing to evaluate: pass --snapshot or --db"),
    };

    let mut report = evaluate_campaign(&snapshot, &config, as_of)?;
    if let Some(store) = &store {
        let resolved = store.resolved_alert_ids(&snapshot.campaign.id)?;
        report = report.apply_resolutions(&resolved);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&snapshot, &report);
    }
    Ok(())
}

fn print_summary(snapshot: &CampaignSnapshot, report: &ComplianceReport) {
    let d = &report.donations;
    let s = &report.spending;

    println!("=== ECFA COMPLIANCE REPORT ===");
    println!("  campaign:        {} ({})", snapshot.campaign.name, report.campaign_id);
    println!("  generated at:    {}", report.generated_at.to_rfc3339());
    println!("  score:           {}%", report.score);
    println!();
    println!("=== DONATIONS ===");
    println!("  total raised:    {}", format_kes(d.total_raised));
    println!("  donations:       {}", d.count);
    println!("  compliant:       {}", d.compliant);
    println!("  flagged:         {}", d.flagged);
    println!("  violations:      {}", d.violation);
    println!("  pending KYC:     {}", d.pending_kyc);
    println!();
    println!("=== SPENDING ===");
    println!(
        "  approved:        {} of {} ({}%, {:?})",
        format_kes(s.total_approved),
        format_kes(s.overall.limit),
        s.overall.utilization_pct,
        s.overall.severity
    );
    println!("  pending review:  {}", s.pending_review);
    for row in &report.category_spending {
        println!(
            "  {:<15} {:>16} / {:<16} {:>6.1}%",
            row.category.label(),
            format_kes(row.spent),
            format_kes(row.limit),
            row.percentage
        );
    }
    println!();
    println!("=== SCORE BY AREA ===");
    for entry in &report.category_breakdown {
        println!(
            "  {:<15} {:>3}%  ({}/{})",
            format!("{:?}", entry.category),
            entry.score,
            entry.passed,
            entry.total
        );
    }
    println!();
    println!("=== ALERTS ===");
    if report.alerts.is_empty() {
        println!("  (none)");
    }
    for alert in &report.alerts {
        let marker = if alert.resolved { "resolved" } else { "open" };
        println!("  [{:?}/{marker}] {}", alert.severity, alert.message);
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
