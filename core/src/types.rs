//! Shared primitive types used across the engine.

use crate::error::{EcfaError, EcfaResult};
use chrono::{DateTime, Utc};

/// An amount in whole Kenya shillings. Signed so that malformed
/// negative input can reach the boundary checks and be rejected.
pub type Kes = i64;

/// A stable, unique identifier for any stored record.
pub type EntityId = String;

/// The canonical campaign identifier.
pub type CampaignId = String;

/// Every timestamp in the engine is UTC.
pub type Timestamp = DateTime<Utc>;

/// Render a KES amount with thousands separators, e.g. `8000` → `"8,000"`.
pub fn group_thousands(amount: Kes) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Sum amounts, failing instead of wrapping when the total leaves `i64`.
pub fn checked_total(amounts: impl IntoIterator<Item = Kes>, scope: &str) -> EcfaResult<Kes> {
    amounts.into_iter().try_fold(0, |total: Kes, amount| {
        total.checked_add(amount).ok_or_else(|| {
            log::warn!("amount overflow while totalling {scope}");
            EcfaError::AmountOverflow {
                scope: scope.to_string(),
            }
        })
    })
}

/// `"KES 8,000"`, the form alert messages use.
pub fn format_kes(amount: Kes) -> String {
    format!("KES {}", group_thousands(amount))
}
