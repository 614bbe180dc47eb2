//! Donation queries.

use super::{parse_timestamp, CampaignStore};
use crate::{
    error::{EcfaError, EcfaResult},
    model::{Donation, KycStatus},
    types::EntityId,
};
use rusqlite::{params, OptionalExtension};

/// Raw column values; enumerations are parsed after the query.
struct DonationRow {
    donation_id: String,
    campaign_id: String,
    donor_name: String,
    phone: String,
    national_id: Option<String>,
    anonymous: bool,
    amount: i64,
    method: String,
    kyc_status: String,
    reference: Option<String>,
    receipt_number: Option<String>,
    donated_at: String,
    recorded_at: String,
}

impl DonationRow {
    fn into_donation(self) -> EcfaResult<Donation> {
        Ok(Donation {
            id: self.donation_id,
            campaign_id: self.campaign_id,
            donor_name: self.donor_name,
            phone: self.phone,
            national_id: self.national_id,
            anonymous: self.anonymous,
            amount: self.amount,
            method: self.method.parse()?,
            kyc_status: self.kyc_status.parse()?,
            reference: self.reference,
            receipt_number: self.receipt_number,
            donated_at: parse_timestamp(&self.donated_at)?,
            recorded_at: parse_timestamp(&self.recorded_at)?,
        })
    }
}

impl CampaignStore {
    /// Record a new donation. An empty id is replaced by a fresh UUID.
    /// Returns the stored id.
    pub fn record_donation(&self, donation: &Donation) -> EcfaResult<EntityId> {
        if donation.amount <= 0 {
            return Err(EcfaError::InvalidAmount {
                record: format!("donation {}", donation.id),
                amount: donation.amount,
            });
        }
        let mut donation = donation.clone();
        if donation.id.is_empty() {
            donation.id = uuid::Uuid::new_v4().to_string();
        }
        self.insert_donation_row(&donation)?;
        log::debug!("recorded donation {}", donation.id);
        Ok(donation.id)
    }

    pub(super) fn insert_donation_row(&self, d: &Donation) -> EcfaResult<()> {
        self.conn.execute(
            "INSERT INTO donation
             (donation_id, campaign_id, donor_name, phone, national_id, anonymous, amount,
              method, kyc_status, reference, receipt_number, donated_at, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                d.id,
                d.campaign_id,
                d.donor_name,
                d.phone,
                d.national_id,
                d.anonymous,
                d.amount,
                d.method.as_str(),
                d.kyc_status.as_str(),
                d.reference,
                d.receipt_number,
                d.donated_at.to_rfc3339(),
                d.recorded_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Advance a donor's KYC status along `pending → verified | failed`.
    pub fn update_kyc_status(&self, donation_id: &str, next: KycStatus) -> EcfaResult<()> {
        let current: Option<String> = self
            .conn
            .query_row(
                "SELECT kyc_status FROM donation WHERE donation_id = ?",
                params![donation_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(current) = current else {
            return Err(EcfaError::RecordNotFound {
                kind: "donation",
                id: donation_id.to_string(),
            });
        };
        let next = current.parse::<KycStatus>()?.transition(next, donation_id)?;
        self.conn.execute(
            "UPDATE donation SET kyc_status = ?1 WHERE donation_id = ?2",
            params![next.as_str(), donation_id],
        )?;
        Ok(())
    }

    pub(super) fn donations_for(&self, campaign_id: &str) -> EcfaResult<Vec<Donation>> {
        let mut stmt = self.conn.prepare(
            "SELECT donation_id, campaign_id, donor_name, phone, national_id, anonymous, amount,
                    method, kyc_status, reference, receipt_number, donated_at, recorded_at
             FROM donation
             WHERE campaign_id = ?
             ORDER BY recorded_at, donation_id",
        )?;
        let rows = stmt.query_map(params![campaign_id], |row| {
            Ok(DonationRow {
                donation_id: row.get(0)?,
                campaign_id: row.get(1)?,
                donor_name: row.get(2)?,
                phone: row.get(3)?,
                national_id: row.get(4)?,
                anonymous: row.get(5)?,
                amount: row.get(6)?,
                method: row.get(7)?,
                kyc_status: row.get(8)?,
                reference: row.get(9)?,
                receipt_number: row.get(10)?,
                donated_at: row.get(11)?,
                recorded_at: row.get(12)?,
            })
        })?;
        rows.map(|row| -> EcfaResult<Donation> { row?.into_donation() })
            .collect()
    }
}
