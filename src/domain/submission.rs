use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    InReview,
    Verified,
    Rejected,
}

impl SubmissionStatus {
    /// Lowercase wire name, shared by filters, reports and audit entries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InReview => "in_review",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified | Self::Rejected)
    }
}

/// One document inside a registration batch.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Document {
    pub name: String,
    pub content: String,
}

impl Document {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// A supplier's registration/compliance batch awaiting admin review.
///
/// `reviewer` doubles as the review lock: while status is `InReview` it
/// names the single admin allowed to verify, reject or release.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Submission {
    pub id: Uuid,
    pub account_id: Uuid,
    /// Ordered as submitted; never empty.
    pub documents: Vec<Document>,
    pub status: SubmissionStatus,
    /// Present iff status is `Rejected`.
    pub rejection_reason: Option<String>,
    /// Present iff status is `InReview`, `Verified` or `Rejected`.
    pub reviewer: Option<Uuid>,
    /// Optional note recorded on verification.
    pub review_note: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl Submission {
    pub fn new(account_id: Uuid, documents: Vec<Document>) -> Result<Self> {
        let mut violations = Vec::new();
        if documents.is_empty() {
            violations.push("documents must not be empty".to_string());
        }
        for (i, doc) in documents.iter().enumerate() {
            if doc.name.trim().is_empty() {
                violations.push(format!("document {i} name must not be empty"));
            }
            if doc.content.trim().is_empty() {
                violations.push(format!("document {i} content must not be empty"));
            }
        }
        if !violations.is_empty() {
            return Err(EngineError::Validation { violations });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            account_id,
            documents,
            status: SubmissionStatus::Pending,
            rejection_reason: None,
            reviewer: None,
            review_note: None,
            submitted_at: Utc::now(),
            claimed_at: None,
            decided_at: None,
        })
    }
}
