//! Approved expenditure per ECFA category.

use crate::{
    error::{EcfaError, EcfaResult},
    model::{CategoryLimits, CategorySpending, SpendingCategory, Transaction, TransactionStatus},
    types::{checked_total, Kes},
};

/// Stateless aggregation over an immutable transaction snapshot.
pub struct TransactionCategoryAggregator;

impl TransactionCategoryAggregator {
    /// One row per category in `SpendingCategory::ALL` order, including
    /// categories with no transactions. Only approved spend counts.
    /// Percentages are unclamped.
    pub fn aggregate(
        transactions: &[Transaction],
        limits: &CategoryLimits,
    ) -> EcfaResult<Vec<CategorySpending>> {
        Self::validate(transactions)?;

        SpendingCategory::ALL
            .into_iter()
            .map(|category| {
                let limit = limits.limit_for(category)?;
                let spent = checked_total(
                    transactions
                        .iter()
                        .filter(|t| {
                            t.category == category && t.status == TransactionStatus::Approved
                        })
                        .map(|t| t.amount),
                    &format!("{category} spend"),
                )?;
                Ok(CategorySpending {
                    category,
                    spent,
                    limit,
                    percentage: spent as f64 * 100.0 / limit as f64,
                })
            })
            .collect()
    }

    /// Sum of every approved transaction, across all categories.
    pub fn total_approved(transactions: &[Transaction]) -> EcfaResult<Kes> {
        Self::validate(transactions)?;
        checked_total(
            transactions
                .iter()
                .filter(|t| t.status == TransactionStatus::Approved)
                .map(|t| t.amount),
            "approved spend",
        )
    }

    fn validate(transactions: &[Transaction]) -> EcfaResult<()> {
        match transactions.iter().find(|t| t.amount <= 0) {
            Some(bad) => {
                log::warn!("rejected transaction {} with amount {}", bad.id, bad.amount);
                Err(EcfaError::InvalidAmount {
                    record: format!("transaction {}", bad.id),
                    amount: bad.amount,
                })
            }
            None => Ok(()),
        }
    }
}
