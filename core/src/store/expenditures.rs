//! Expenditure queries.

use super::{parse_timestamp, CampaignStore};
use crate::{
    error::{EcfaError, EcfaResult},
    model::{Transaction, TransactionStatus},
    types::EntityId,
};
use rusqlite::{params, OptionalExtension};

struct ExpenditureRow {
    transaction_id: String,
    campaign_id: String,
    category: String,
    amount: i64,
    status: String,
    description: String,
    incurred_at: String,
}

impl CampaignStore {
    /// Record a new expenditure. New expenditures are always pending;
    /// use `review_transaction` to approve or reject them.
    pub fn record_transaction(&self, transaction: &Transaction) -> EcfaResult<EntityId> {
        if transaction.amount <= 0 {
            return Err(EcfaError::InvalidAmount {
                record: format!("transaction {}", transaction.id),
                amount: transaction.amount,
            });
        }
        if transaction.status != TransactionStatus::Pending {
            return Err(EcfaError::InvalidTransition {
                kind: "transaction status",
                record: transaction.id.clone(),
                from: "new".to_string(),
                to: transaction.status.as_str().to_string(),
            });
        }
        let mut transaction = transaction.clone();
        if transaction.id.is_empty() {
            transaction.id = uuid::Uuid::new_v4().to_string();
        }
        self.insert_expenditure_row(&transaction)?;
        Ok(transaction.id)
    }

    pub(super) fn insert_expenditure_row(&self, t: &Transaction) -> EcfaResult<()> {
        self.conn.execute(
            "INSERT INTO expenditure
             (transaction_id, campaign_id, category, amount, status, description, incurred_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                t.id,
                t.campaign_id,
                t.category.label(),
                t.amount,
                t.status.as_str(),
                t.description,
                t.incurred_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Approve or reject a pending expenditure. Reviewed rows are final.
    pub fn review_transaction(
        &self,
        transaction_id: &str,
        decision: TransactionStatus,
    ) -> EcfaResult<()> {
        let current: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM expenditure WHERE transaction_id = ?",
                params![transaction_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(current) = current else {
            return Err(EcfaError::RecordNotFound {
                kind: "transaction",
                id: transaction_id.to_string(),
            });
        };
        let next = current
            .parse::<TransactionStatus>()?
            .review(decision, transaction_id)?;
        self.conn.execute(
            "UPDATE expenditure SET status = ?1 WHERE transaction_id = ?2",
            params![next.as_str(), transaction_id],
        )?;
        log::debug!("transaction {transaction_id} reviewed: {}", next.as_str());
        Ok(())
    }

    pub(super) fn expenditures_for(&self, campaign_id: &str) -> EcfaResult<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT transaction_id, campaign_id, category, amount, status, description, incurred_at
             FROM expenditure
             WHERE campaign_id = ?
             ORDER BY incurred_at, transaction_id",
        )?;
        let rows = stmt.query_map(params![campaign_id], |row| {
            Ok(ExpenditureRow {
                transaction_id: row.get(0)?,
                campaign_id: row.get(1)?,
                category: row.get(2)?,
                amount: row.get(3)?,
                status: row.get(4)?,
                description: row.get(5)?,
                incurred_at: row.get(6)?,
            })
        })?;
        rows.map(|row| -> EcfaResult<Transaction> {
            let row = row?;
            Ok(Transaction {
                id: row.transaction_id,
                campaign_id: row.campaign_id,
                category: row.category.parse()?,
                amount: row.amount,
                status: row.status.parse()?,
                description: row.description,
                incurred_at: parse_timestamp(&row.incurred_at)?,
            })
        })
        .collect()
    }
}
