use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Every rejected command maps to exactly one of these variants so callers
/// can tell "not allowed" from "not possible" from "malformed".
#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed input. Lists every violated field, not just the first.
    #[error("validation failed: {}", violations.join("; "))]
    Validation { violations: Vec<String> },

    #[error("not authorized: {reason}")]
    Authorization { reason: String },

    /// The entity's current status does not permit the requested action.
    #[error("{entity} in status '{from}' does not permit {action}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        action: &'static str,
    },

    /// Review lock contention: another admin already holds the claim.
    #[error("submission {submission} is already claimed by {reviewer}")]
    AlreadyClaimed { submission: Uuid, reviewer: Uuid },

    #[error("account {account} is not eligible for payouts")]
    IneligibleAccount { account: Uuid },

    #[error("requested {requested} exceeds available balance {available}")]
    InsufficientBalance {
        requested: Decimal,
        available: Decimal,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal error: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl EngineError {
    pub fn validation(violation: impl Into<String>) -> Self {
        Self::Validation {
            violations: vec![violation.into()],
        }
    }
}
