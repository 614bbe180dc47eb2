//! SQLite persistence layer.
//!
//! RULE: Only store/ talks to the database.
//! Stored enumeration strings are parsed back through `FromStr`, so a
//! corrupted row surfaces as an error instead of a silent default.

use crate::{
    error::{EcfaError, EcfaResult},
    model::{Campaign, CategoryLimits, Donation, SpendingCategory, Transaction},
    report::CampaignSnapshot,
    source::CampaignSource,
    types::Timestamp,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;

mod donations;
mod expenditures;

pub struct CampaignStore {
    conn: Connection,
}

impl CampaignStore {
    pub fn open(path: &str) -> EcfaResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> EcfaResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> EcfaResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_campaign.sql"))?;
        log::info!("campaign store migrated");
        Ok(())
    }

    // ── Campaign ───────────────────────────────────────────────

    pub fn insert_campaign(&self, campaign: &Campaign) -> EcfaResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        self.insert_campaign_rows(campaign)?;
        tx.commit()?;
        Ok(())
    }

    /// Bulk-load an existing campaign history as-is, including records
    /// that have already been reviewed. All or nothing: a failing row
    /// rolls back the campaign and every row written before it.
    pub fn import_snapshot(&self, snapshot: &CampaignSnapshot) -> EcfaResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        self.insert_campaign_rows(&snapshot.campaign)?;
        for donation in &snapshot.donations {
            self.insert_donation_row(donation)?;
        }
        for transaction in &snapshot.transactions {
            self.insert_expenditure_row(transaction)?;
        }
        tx.commit()?;
        log::info!(
            "imported campaign {}: {} donations, {} expenditures",
            snapshot.campaign.id,
            snapshot.donations.len(),
            snapshot.transactions.len()
        );
        Ok(())
    }

    fn insert_campaign_rows(&self, campaign: &Campaign) -> EcfaResult<()> {
        self.conn.execute(
            "INSERT INTO campaign (campaign_id, name, spending_limit) VALUES (?1, ?2, ?3)",
            params![campaign.id, campaign.name, campaign.spending_limit],
        )?;
        for (category, limit) in campaign.category_limits.iter() {
            self.conn.execute(
                "INSERT INTO campaign_category_limit (campaign_id, category, limit_kes)
                 VALUES (?1, ?2, ?3)",
                params![campaign.id, category.label(), limit],
            )?;
        }
        Ok(())
    }

    // ── Alert resolution ───────────────────────────────────────

    pub fn set_alert_resolved(
        &self,
        campaign_id: &str,
        alert_id: &str,
        resolved: bool,
    ) -> EcfaResult<()> {
        if resolved {
            self.conn.execute(
                "INSERT OR IGNORE INTO alert_resolution (campaign_id, alert_id) VALUES (?1, ?2)",
                params![campaign_id, alert_id],
            )?;
        } else {
            self.conn.execute(
                "DELETE FROM alert_resolution WHERE campaign_id = ?1 AND alert_id = ?2",
                params![campaign_id, alert_id],
            )?;
        }
        Ok(())
    }

    pub fn resolved_alert_ids(&self, campaign_id: &str) -> EcfaResult<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT alert_id FROM alert_resolution WHERE campaign_id = ?")?;
        let rows = stmt.query_map(params![campaign_id], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<HashSet<_>, _>>().map_err(Into::into)
    }
}

impl CampaignSource for CampaignStore {
    fn fetch_campaign(&self, campaign_id: &str) -> EcfaResult<Campaign> {
        let row = self
            .conn
            .query_row(
                "SELECT campaign_id, name, spending_limit FROM campaign WHERE campaign_id = ?",
                params![campaign_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;
        let Some((id, name, spending_limit)) = row else {
            return Err(EcfaError::CampaignNotFound {
                campaign_id: campaign_id.to_string(),
            });
        };

        let mut stmt = self.conn.prepare(
            "SELECT category, limit_kes FROM campaign_category_limit WHERE campaign_id = ?",
        )?;
        let rows = stmt.query_map(params![campaign_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut category_limits = CategoryLimits::new();
        for row in rows {
            let (category, limit) = row?;
            category_limits.set(category.parse::<SpendingCategory>()?, limit);
        }

        Ok(Campaign {
            id,
            name,
            spending_limit,
            category_limits,
        })
    }

    fn fetch_donations(&self, campaign_id: &str) -> EcfaResult<Vec<Donation>> {
        self.donations_for(campaign_id)
    }

    fn fetch_transactions(&self, campaign_id: &str) -> EcfaResult<Vec<Transaction>> {
        self.expenditures_for(campaign_id)
    }
}

fn parse_timestamp(value: &str) -> EcfaResult<Timestamp> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| EcfaError::Other(anyhow::anyhow!("bad timestamp {value:?}: {e}")))
}
