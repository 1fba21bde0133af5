//! Append-only transition records.
//!
//! Every applied state transition writes one entry; entries are never
//! mutated or deleted. Detail views reconstruct an entity's history by
//! replaying its entries in `seq` order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Account,
    Submission,
    Payout,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Submission => "submission",
            Self::Payout => "payout",
        }
    }
}

/// Immutable record of a single state transition.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct AuditEntry {
    /// Store-assigned, strictly increasing across the whole log.
    pub seq: u64,
    pub entity: EntityKind,
    pub entity_id: Uuid,
    pub actor: Uuid,
    /// `None` for creation entries.
    pub prior: Option<String>,
    pub next: String,
    pub reason: Option<String>,
    pub at: DateTime<Utc>,
}

impl AuditEntry {
    /// Builds an unsequenced entry; the audit log assigns `seq` on append.
    pub fn transition(
        entity: EntityKind,
        entity_id: Uuid,
        actor: Uuid,
        prior: Option<&str>,
        next: &str,
        reason: Option<String>,
    ) -> Self {
        Self {
            seq: 0,
            entity,
            entity_id,
            actor,
            prior: prior.map(str::to_string),
            next: next.to_string(),
            reason,
            at: Utc::now(),
        }
    }
}
