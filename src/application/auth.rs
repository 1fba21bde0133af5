//! Authorization guard.
//!
//! One fixed table keyed by (role, action, ownership), consulted by every
//! engine command before any state is touched. The guard is a pure decision:
//! it never mutates anything and never reasons about entity status —
//! transition legality is the state machines' concern and fails with
//! `InvalidTransition`, a distinct error, so callers can tell "not allowed"
//! from "not possible".

use crate::domain::account::Role;
use crate::error::{EngineError, Result};
use uuid::Uuid;

/// The acting identity, supplied by the session boundary on every call.
/// The engine trusts it and performs no credential verification itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SubmitBatch,
    SetPayoutProfile,
    RequestPayout,
    ClaimReview,
    VerifySubmission,
    RejectSubmission,
    ReleaseReview,
    DecidePayout,
    MarkPaid,
    CreditEarnings,
    DeactivateAccount,
    ReadEntity,
    ListEntities,
}

impl Action {
    fn capability(&self) -> &'static str {
        match self {
            Self::SubmitBatch => "submit a batch",
            Self::SetPayoutProfile => "update a payout profile",
            Self::RequestPayout => "request a payout",
            Self::ClaimReview => "claim a review",
            Self::VerifySubmission => "verify a submission",
            Self::RejectSubmission => "reject a submission",
            Self::ReleaseReview => "release a review",
            Self::DecidePayout => "decide a payout request",
            Self::MarkPaid => "mark a payout as paid",
            Self::CreditEarnings => "credit earnings",
            Self::DeactivateAccount => "deactivate an account",
            Self::ReadEntity => "read this entity",
            Self::ListEntities => "list these entities",
        }
    }
}

/// `owner` is the account that owns the target entity, when the action has
/// a target. For `ListEntities` it is the account filter of the query
/// (`None` means "all accounts", which only admins may ask for).
pub fn authorize(actor: &Actor, action: Action, owner: Option<Uuid>) -> Result<()> {
    let allowed = match (actor.role, action) {
        // Suppliers act on their own account only.
        (
            Role::Supplier,
            Action::SubmitBatch
            | Action::SetPayoutProfile
            | Action::RequestPayout
            | Action::ReadEntity
            | Action::ListEntities,
        ) => owner == Some(actor.id),

        // Admins hold the full review/payout/ledger capability set.
        (
            Role::Admin,
            Action::ClaimReview
            | Action::VerifySubmission
            | Action::RejectSubmission
            | Action::ReleaseReview
            | Action::DecidePayout
            | Action::MarkPaid
            | Action::CreditEarnings
            | Action::DeactivateAccount
            | Action::ReadEntity
            | Action::ListEntities,
        ) => true,

        _ => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(EngineError::Authorization {
            reason: format!("role '{:?}' may not {}", actor.role, action.capability()),
        })
    }
}
