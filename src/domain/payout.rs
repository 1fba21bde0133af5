use crate::domain::account::Amount;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    Requested,
    Approved,
    Rejected,
    Paid,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Paid => "paid",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Paid)
    }
}

/// A supplier's request to withdraw available funds.
///
/// Created only for verified accounts; the amount is checked against the
/// recomputed available balance both at request and at decision time.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PayoutRequest {
    pub id: Uuid,
    pub account_id: Uuid,
    pub amount: Amount,
    pub status: PayoutStatus,
    /// Present iff a decision has been made; mandatory for rejections.
    pub decision_reason: Option<String>,
    pub decided_by: Option<Uuid>,
    /// Opaque settlement reference, present iff status is `Paid`.
    pub external_reference: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl PayoutRequest {
    pub fn new(account_id: Uuid, amount: Amount) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            account_id,
            amount,
            status: PayoutStatus::Requested,
            decision_reason: None,
            decided_by: None,
            external_reference: None,
            requested_at: Utc::now(),
            decided_at: None,
            paid_at: None,
        })
    }
}
