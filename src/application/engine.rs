use crate::application::auth::{Action, Actor, authorize};
use crate::application::locks::KeyedLocks;
use crate::domain::account::{Account, Amount, PayoutProfile, Role, Standing};
use crate::domain::audit::{AuditEntry, EntityKind};
use crate::domain::payout::PayoutRequest;
use crate::domain::ports::{AccountStoreBox, AuditLogBox, PayoutStoreBox, SubmissionStoreBox};
use crate::domain::submission::Submission;
use crate::error::{EngineError, Result};
use uuid::Uuid;

/// The main entry point for the verification and payout console.
///
/// `Engine` owns the storage backends and serializes mutating commands per
/// entity through keyed locks, so transitions on a single entity are
/// linearized while unrelated entities proceed independently. Every command
/// validates fully before writing; entity state and the matching audit entry
/// are written together or not at all.
pub struct Engine {
    pub(crate) accounts: AccountStoreBox,
    pub(crate) submissions: SubmissionStoreBox,
    pub(crate) payouts: PayoutStoreBox,
    pub(crate) audit: AuditLogBox,
    pub(crate) account_locks: KeyedLocks,
    pub(crate) submission_locks: KeyedLocks,
    pub(crate) payout_locks: KeyedLocks,
}

impl Engine {
    pub fn new(
        accounts: AccountStoreBox,
        submissions: SubmissionStoreBox,
        payouts: PayoutStoreBox,
        audit: AuditLogBox,
    ) -> Self {
        Self {
            accounts,
            submissions,
            payouts,
            audit,
            account_locks: KeyedLocks::new(),
            submission_locks: KeyedLocks::new(),
            payout_locks: KeyedLocks::new(),
        }
    }

    // ── Account commands ──────────────────────────────────────────────────

    /// Registers a new account. Called by the session boundary at signup,
    /// so there is no acting identity yet.
    pub async fn register_account(&self, name: &str, role: Role) -> Result<Account> {
        if self.accounts.find_by_name(name).await?.is_some() {
            return Err(EngineError::validation(format!(
                "account name '{name}' is already taken"
            )));
        }
        let account = Account::new(name, role)?;
        self.accounts.put(account.clone()).await?;
        self.audit
            .append(AuditEntry::transition(
                EntityKind::Account,
                account.id,
                account.id,
                None,
                "active",
                None,
            ))
            .await?;
        tracing::info!(account = %account.id, name, ?role, "account registered");
        Ok(account)
    }

    /// Files or replaces the supplier's bank/contact details.
    pub async fn set_payout_profile(
        &self,
        actor: &Actor,
        account_id: Uuid,
        profile: PayoutProfile,
    ) -> Result<Account> {
        authorize(actor, Action::SetPayoutProfile, Some(account_id))?;
        let _guard = self.account_locks.lock(account_id).await;

        let mut account = self.require_account(account_id).await?;
        account.payout_profile = Some(profile);
        self.accounts.put(account.clone()).await?;
        tracing::info!(account = %account_id, "payout profile updated");
        Ok(account)
    }

    /// Credits earnings reported by the external ledger boundary.
    pub async fn credit_earnings(
        &self,
        actor: &Actor,
        account_id: Uuid,
        amount: Amount,
    ) -> Result<Account> {
        authorize(actor, Action::CreditEarnings, Some(account_id))?;
        let _guard = self.account_locks.lock(account_id).await;

        let mut account = self.require_account(account_id).await?;
        account.credit_earnings(amount);
        self.accounts.put(account.clone()).await?;
        tracing::info!(account = %account_id, amount = %amount.value(), "earnings credited");
        Ok(account)
    }

    /// Deactivates an account. Accounts are never deleted.
    pub async fn deactivate_account(&self, actor: &Actor, account_id: Uuid) -> Result<Account> {
        authorize(actor, Action::DeactivateAccount, Some(account_id))?;
        let _guard = self.account_locks.lock(account_id).await;

        let mut account = self.require_account(account_id).await?;
        if account.standing == Standing::Deactivated {
            return Err(EngineError::InvalidTransition {
                entity: "account",
                from: "deactivated".into(),
                action: "deactivate",
            });
        }
        account.standing = Standing::Deactivated;
        self.accounts.put(account.clone()).await?;
        self.audit
            .append(AuditEntry::transition(
                EntityKind::Account,
                account_id,
                actor.id,
                Some("active"),
                "deactivated",
                None,
            ))
            .await?;
        tracing::info!(account = %account_id, admin = %actor.id, "account deactivated");
        Ok(account)
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Resolves a login handle to its account. Used by the session
    /// boundary, which authenticates callers before the engine ever sees
    /// an actor.
    pub async fn account_by_name(&self, name: &str) -> Result<Option<Account>> {
        self.accounts.find_by_name(name).await
    }

    pub async fn account(&self, actor: &Actor, account_id: Uuid) -> Result<Account> {
        authorize(actor, Action::ReadEntity, Some(account_id))?;
        self.require_account(account_id).await
    }

    pub async fn submission(&self, actor: &Actor, submission_id: Uuid) -> Result<Submission> {
        let submission = self.require_submission(submission_id).await?;
        authorize(actor, Action::ReadEntity, Some(submission.account_id))?;
        Ok(submission)
    }

    pub async fn payout(&self, actor: &Actor, payout_id: Uuid) -> Result<PayoutRequest> {
        let payout = self.require_payout(payout_id).await?;
        authorize(actor, Action::ReadEntity, Some(payout.account_id))?;
        Ok(payout)
    }

    /// Transition history for detail views, replayed from the audit log.
    pub async fn history(
        &self,
        actor: &Actor,
        entity: EntityKind,
        entity_id: Uuid,
    ) -> Result<Vec<AuditEntry>> {
        let owner = match entity {
            EntityKind::Account => entity_id,
            EntityKind::Submission => self.require_submission(entity_id).await?.account_id,
            EntityKind::Payout => self.require_payout(entity_id).await?.account_id,
        };
        authorize(actor, Action::ReadEntity, Some(owner))?;
        self.audit.for_entity(entity, entity_id).await
    }

    // ── Internal helpers ──────────────────────────────────────────────────

    pub(crate) async fn require_account(&self, id: Uuid) -> Result<Account> {
        self.accounts
            .get(id)
            .await?
            .ok_or(EngineError::NotFound {
                entity: "account",
                id,
            })
    }

    pub(crate) async fn require_submission(&self, id: Uuid) -> Result<Submission> {
        self.submissions
            .get(id)
            .await?
            .ok_or(EngineError::NotFound {
                entity: "submission",
                id,
            })
    }

    pub(crate) async fn require_payout(&self, id: Uuid) -> Result<PayoutRequest> {
        self.payouts.get(id).await?.ok_or(EngineError::NotFound {
            entity: "payout",
            id,
        })
    }
}
