//! Payout lifecycle state machine.
//!
//! `requested → {approved, rejected}`, then `approved → paid`; `rejected`
//! and `paid` are terminal. The balance is recomputed from the full payout
//! history at request time and again at approval time — never trusted from
//! an earlier check — and `request` calls against the same account are
//! serialized through the per-account lock so concurrent requests cannot
//! jointly overdraw.

use crate::application::auth::{Action, Actor, authorize};
use crate::application::engine::Engine;
use crate::domain::account::{Account, Amount, Balance};
use crate::domain::audit::{AuditEntry, EntityKind};
use crate::domain::payout::{PayoutRequest, PayoutStatus};
use crate::error::{EngineError, Result};
use chrono::Utc;
use uuid::Uuid;

/// Admin decision on a requested payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Engine {
    /// Supplier requests a withdrawal against their available balance.
    pub async fn request_payout(
        &self,
        actor: &Actor,
        account_id: Uuid,
        amount: Amount,
    ) -> Result<PayoutRequest> {
        authorize(actor, Action::RequestPayout, Some(account_id))?;
        let _guard = self.account_locks.lock(account_id).await;

        let account = self.require_account(account_id).await?;
        if !account.is_active() || !account.is_verified() {
            return Err(EngineError::IneligibleAccount {
                account: account_id,
            });
        }
        if account.payout_profile.is_none() {
            return Err(EngineError::validation(
                "a payout profile must be on file before requesting a payout",
            ));
        }
        // Outstanding requests reserve funds, so two requests that each fit
        // the balance but jointly exceed it cannot both pass this check.
        let history = self.payouts.for_account(account_id).await?;
        let spendable = account.spendable_balance(&history);
        if Balance::from(amount) > spendable {
            return Err(EngineError::InsufficientBalance {
                requested: amount.value(),
                available: spendable.0,
            });
        }

        let payout = PayoutRequest::new(account_id, amount)?;
        self.payouts.put(payout.clone()).await?;
        self.audit
            .append(AuditEntry::transition(
                EntityKind::Payout,
                payout.id,
                actor.id,
                None,
                PayoutStatus::Requested.as_str(),
                None,
            ))
            .await?;
        tracing::info!(payout = %payout.id, account = %account_id, amount = %amount.value(), "payout requested");
        Ok(payout)
    }

    /// Admin decides a requested payout: `requested → {approved, rejected}`.
    ///
    /// Approval re-checks the balance against the full history at decision
    /// time; a request that has gone stale against newer approvals fails
    /// `InsufficientBalance` and stays `requested`. Rejections require a
    /// reason.
    pub async fn decide_payout(
        &self,
        actor: &Actor,
        payout_id: Uuid,
        decision: Decision,
        reason: Option<String>,
    ) -> Result<PayoutRequest> {
        authorize(actor, Action::DecidePayout, None)?;
        if decision == Decision::Rejected
            && reason.as_deref().is_none_or(|r| r.trim().is_empty())
        {
            return Err(EngineError::validation(
                "a rejection reason is mandatory when denying a payout",
            ));
        }

        let _guard = self.payout_locks.lock(payout_id).await;
        let mut payout = self.require_payout(payout_id).await?;
        if payout.status != PayoutStatus::Requested {
            return Err(EngineError::InvalidTransition {
                entity: "payout",
                from: payout.status.as_str().into(),
                action: "decide",
            });
        }

        let next = match decision {
            Decision::Approved => {
                // Approval commits funds, so it contends with new requests on
                // the same account and must hold the account lock while it
                // re-validates the balance.
                let _account_guard = self.account_locks.lock(payout.account_id).await;
                let account = self.require_account(payout.account_id).await?;
                let available = self.available_balance_of(&account).await?;
                if Balance::from(payout.amount) > available {
                    return Err(EngineError::InsufficientBalance {
                        requested: payout.amount.value(),
                        available: available.0,
                    });
                }
                payout.status = PayoutStatus::Approved;
                payout.decision_reason = reason;
                payout.decided_by = Some(actor.id);
                payout.decided_at = Some(Utc::now());
                self.payouts.put(payout.clone()).await?;
                PayoutStatus::Approved
            }
            Decision::Rejected => {
                payout.status = PayoutStatus::Rejected;
                payout.decision_reason = reason;
                payout.decided_by = Some(actor.id);
                payout.decided_at = Some(Utc::now());
                self.payouts.put(payout.clone()).await?;
                PayoutStatus::Rejected
            }
        };

        self.audit
            .append(AuditEntry::transition(
                EntityKind::Payout,
                payout_id,
                actor.id,
                Some(PayoutStatus::Requested.as_str()),
                next.as_str(),
                payout.decision_reason.clone(),
            ))
            .await?;
        tracing::info!(payout = %payout_id, admin = %actor.id, status = next.as_str(), "payout decided");
        Ok(payout)
    }

    /// Admin records settlement: `approved → paid`.
    ///
    /// The reference is an opaque audit string, validated only as non-empty;
    /// actual money movement happens outside the engine.
    pub async fn mark_paid(
        &self,
        actor: &Actor,
        payout_id: Uuid,
        external_reference: &str,
    ) -> Result<PayoutRequest> {
        authorize(actor, Action::MarkPaid, None)?;
        if external_reference.trim().is_empty() {
            return Err(EngineError::validation(
                "external reference must not be empty",
            ));
        }

        let _guard = self.payout_locks.lock(payout_id).await;
        let mut payout = self.require_payout(payout_id).await?;
        if payout.status != PayoutStatus::Approved {
            return Err(EngineError::InvalidTransition {
                entity: "payout",
                from: payout.status.as_str().into(),
                action: "mark_paid",
            });
        }

        payout.status = PayoutStatus::Paid;
        payout.external_reference = Some(external_reference.to_string());
        payout.paid_at = Some(Utc::now());
        self.payouts.put(payout.clone()).await?;
        self.audit
            .append(AuditEntry::transition(
                EntityKind::Payout,
                payout_id,
                actor.id,
                Some(PayoutStatus::Approved.as_str()),
                PayoutStatus::Paid.as_str(),
                Some(external_reference.to_string()),
            ))
            .await?;
        tracing::info!(payout = %payout_id, admin = %actor.id, reference = external_reference, "payout paid");
        Ok(payout)
    }

    /// Available balance for an account, recomputed from the full payout
    /// history on every call.
    pub async fn available_balance_of(&self, account: &Account) -> Result<Balance> {
        let history = self.payouts.for_account(account.id).await?;
        Ok(account.available_balance(&history))
    }
}
