use thiserror::Error;

#[derive(Error, Debug)]
pub enum EcfaError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid amount for {record}: {amount} (must be positive)")]
    InvalidAmount { record: String, amount: i64 },

    #[error("Invalid limit for {scope}: {limit} (must be positive)")]
    InvalidLimit { scope: String, limit: i64 },

    #[error("No spending limit configured for category '{category}'")]
    MissingCategoryLimit { category: String },

    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Invalid {kind} transition for {record}: {from} -> {to}")]
    InvalidTransition {
        kind: &'static str,
        record: String,
        from: String,
        to: String,
    },

    #[error("Amount overflow while totalling {scope}")]
    AmountOverflow { scope: String },

    #[error("Campaign '{campaign_id}' not found")]
    CampaignNotFound { campaign_id: String },

    #[error("{kind} '{id}' not found")]
    RecordNotFound { kind: &'static str, id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EcfaResult<T> = Result<T, EcfaError>;
