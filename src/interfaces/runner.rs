//! Script runner: drives the engine from a command script.
//!
//! Rows reference entities by human-readable handles; the runner maps each
//! handle to the Uuid generated at creation so scripts stay writable by
//! hand. Reports re-translate ids back to handles.

use crate::application::auth::Actor;
use crate::application::engine::Engine;
use crate::application::query::{Filter, Sort};
use crate::domain::account::{Amount, PayoutProfile, Role};
use crate::domain::submission::Document;
use crate::error::{EngineError, Result};
use crate::interfaces::csv::command_reader::{Command, Op};
use crate::interfaces::csv::report_writer::{AccountRow, PayoutRow, SubmissionRow};
use std::collections::HashMap;
use uuid::Uuid;

pub struct ScriptRunner {
    engine: Engine,
    accounts: HashMap<String, (Uuid, Role)>,
    submissions: HashMap<String, Uuid>,
    payouts: HashMap<String, Uuid>,
}

impl ScriptRunner {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            accounts: HashMap::new(),
            submissions: HashMap::new(),
            payouts: HashMap::new(),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The console's own identity, used for report reads.
    fn service_actor() -> Actor {
        Actor::new(Uuid::nil(), Role::Admin)
    }

    /// Applies one command. Errors name the offending handle so the caller
    /// can report the row and keep processing the rest of the script.
    pub async fn apply(&mut self, command: Command) -> Result<()> {
        match command.op {
            Op::RegisterSupplier => {
                let account = self
                    .engine
                    .register_account(&command.actor, Role::Supplier)
                    .await?;
                self.accounts
                    .insert(command.actor, (account.id, Role::Supplier));
            }
            Op::RegisterAdmin => {
                let account = self
                    .engine
                    .register_account(&command.actor, Role::Admin)
                    .await?;
                self.accounts.insert(command.actor, (account.id, Role::Admin));
            }
            Op::Profile => {
                let actor = self.actor(&command.actor).await?;
                let (bank, email) = command
                    .note
                    .split_once('|')
                    .ok_or_else(|| {
                        EngineError::validation("profile note must be 'bank|email'")
                    })?;
                let profile = PayoutProfile::new(bank.trim(), email.trim())?;
                self.engine
                    .set_payout_profile(&actor, actor.id, profile)
                    .await?;
            }
            Op::Credit => {
                let actor = self.actor(&command.actor).await?;
                let target = self.account_id(&command.entity).await?;
                let amount = self.amount(&command)?;
                self.engine.credit_earnings(&actor, target, amount).await?;
            }
            Op::Submit => {
                let actor = self.actor(&command.actor).await?;
                let documents = parse_documents(&command.note);
                let submission = self.engine.submit(&actor, actor.id, documents).await?;
                self.submissions.insert(command.entity, submission.id);
            }
            Op::Claim => {
                let actor = self.actor(&command.actor).await?;
                let id = self.submission_id(&command.entity)?;
                self.engine.claim(&actor, id).await?;
            }
            Op::Verify => {
                let actor = self.actor(&command.actor).await?;
                let id = self.submission_id(&command.entity)?;
                let notes = (!command.note.is_empty()).then(|| command.note.clone());
                self.engine.verify(&actor, id, notes).await?;
            }
            Op::Reject => {
                let actor = self.actor(&command.actor).await?;
                let id = self.submission_id(&command.entity)?;
                self.engine.reject(&actor, id, &command.note).await?;
            }
            Op::Release => {
                let actor = self.actor(&command.actor).await?;
                let id = self.submission_id(&command.entity)?;
                self.engine.release(&actor, id).await?;
            }
            Op::Request => {
                let actor = self.actor(&command.actor).await?;
                let amount = self.amount(&command)?;
                let payout = self.engine.request_payout(&actor, actor.id, amount).await?;
                self.payouts.insert(command.entity, payout.id);
            }
            Op::Approve => {
                let actor = self.actor(&command.actor).await?;
                let id = self.payout_id(&command.entity)?;
                let reason = (!command.note.is_empty()).then(|| command.note.clone());
                self.engine
                    .decide_payout(&actor, id, crate::application::payouts::Decision::Approved, reason)
                    .await?;
            }
            Op::Deny => {
                let actor = self.actor(&command.actor).await?;
                let id = self.payout_id(&command.entity)?;
                self.engine
                    .decide_payout(
                        &actor,
                        id,
                        crate::application::payouts::Decision::Rejected,
                        Some(command.note.clone()),
                    )
                    .await?;
            }
            Op::Paid => {
                let actor = self.actor(&command.actor).await?;
                let id = self.payout_id(&command.entity)?;
                self.engine.mark_paid(&actor, id, &command.note).await?;
            }
            Op::Deactivate => {
                let actor = self.actor(&command.actor).await?;
                let target = self.account_id(&command.entity).await?;
                self.engine.deactivate_account(&actor, target).await?;
            }
        }
        Ok(())
    }

    // ── Reports ───────────────────────────────────────────────────────────

    pub async fn accounts_report(&self) -> Result<Vec<AccountRow>> {
        let actor = Self::service_actor();
        let mut handles: Vec<&String> = self.accounts.keys().collect();
        handles.sort();

        let mut rows = Vec::with_capacity(handles.len());
        for handle in handles {
            let (id, _) = self.accounts[handle];
            let account = self.engine.account(&actor, id).await?;
            let available = self.engine.available_balance_of(&account).await?;
            rows.push(AccountRow {
                account: handle.clone(),
                role: match account.role {
                    Role::Supplier => "supplier".into(),
                    Role::Admin => "admin".into(),
                },
                verified: account.is_verified(),
                earned: account.total_earned.0,
                available: available.0,
            });
        }
        Ok(rows)
    }

    pub async fn submissions_report(&self) -> Result<Vec<SubmissionRow>> {
        let actor = Self::service_actor();
        let listing = self
            .engine
            .list_submissions(&actor, Filter::default(), Sort::default(), None)
            .await?;

        let mut rows = Vec::with_capacity(listing.items.len());
        for submission in &listing.items {
            rows.push(SubmissionRow {
                submission: self.handle_of(&self.submissions, submission.id),
                account: self.account_handle(submission.account_id),
                status: submission.status.as_str().into(),
                reviewer: submission
                    .reviewer
                    .map(|r| self.account_handle(r))
                    .unwrap_or_default(),
                reason: submission.rejection_reason.clone().unwrap_or_default(),
            });
        }
        rows.sort_by(|a, b| a.submission.cmp(&b.submission));
        Ok(rows)
    }

    pub async fn payouts_report(&self) -> Result<Vec<PayoutRow>> {
        let actor = Self::service_actor();
        let listing = self
            .engine
            .list_payouts(&actor, Filter::default(), Sort::default(), None)
            .await?;

        let mut rows = Vec::with_capacity(listing.items.len());
        for payout in &listing.items {
            rows.push(PayoutRow {
                payout: self.handle_of(&self.payouts, payout.id),
                account: self.account_handle(payout.account_id),
                amount: payout.amount.value(),
                status: payout.status.as_str().into(),
                reference: payout.external_reference.clone().unwrap_or_default(),
            });
        }
        rows.sort_by(|a, b| a.payout.cmp(&b.payout));
        Ok(rows)
    }

    // ── Handle resolution ─────────────────────────────────────────────────

    /// Resolves an account handle, falling back to the store so scripts can
    /// pick up accounts persisted by an earlier run.
    async fn actor(&mut self, handle: &str) -> Result<Actor> {
        if let Some((id, role)) = self.accounts.get(handle) {
            return Ok(Actor::new(*id, *role));
        }
        if let Some(account) = self.engine.account_by_name(handle).await? {
            self.accounts
                .insert(handle.to_string(), (account.id, account.role));
            return Ok(Actor::new(account.id, account.role));
        }
        Err(EngineError::validation(format!("unknown account '{handle}'")))
    }

    async fn account_id(&mut self, handle: &str) -> Result<Uuid> {
        Ok(self.actor(handle).await?.id)
    }

    fn submission_id(&self, handle: &str) -> Result<Uuid> {
        self.submissions
            .get(handle)
            .copied()
            .ok_or_else(|| EngineError::validation(format!("unknown submission '{handle}'")))
    }

    fn payout_id(&self, handle: &str) -> Result<Uuid> {
        self.payouts
            .get(handle)
            .copied()
            .ok_or_else(|| EngineError::validation(format!("unknown payout '{handle}'")))
    }

    fn account_handle(&self, id: Uuid) -> String {
        self.accounts
            .iter()
            .find(|(_, (candidate, _))| *candidate == id)
            .map(|(handle, _)| handle.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn handle_of(&self, map: &HashMap<String, Uuid>, id: Uuid) -> String {
        map.iter()
            .find(|(_, candidate)| **candidate == id)
            .map(|(handle, _)| handle.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn amount(&self, command: &Command) -> Result<Amount> {
        let value = command
            .amount
            .ok_or_else(|| EngineError::validation("amount is required for this op"))?;
        Amount::new(value)
    }
}

/// Documents come as `name:content` pairs separated by `|`. A pair without
/// a colon uses the whole text as both name and content.
fn parse_documents(note: &str) -> Vec<Document> {
    note.split('|')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| match pair.split_once(':') {
            Some((name, content)) => Document::new(name.trim(), content.trim()),
            None => Document::new(pair.trim(), pair.trim()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::{
        InMemoryAccountStore, InMemoryAuditLog, InMemoryPayoutStore, InMemorySubmissionStore,
    };
    use rust_decimal_macros::dec;

    fn runner() -> ScriptRunner {
        ScriptRunner::new(Engine::new(
            Box::new(InMemoryAccountStore::new()),
            Box::new(InMemorySubmissionStore::new()),
            Box::new(InMemoryPayoutStore::new()),
            Box::new(InMemoryAuditLog::new()),
        ))
    }

    fn command(op: Op, actor: &str, entity: &str, amount: Option<&str>, note: &str) -> Command {
        Command {
            op,
            actor: actor.into(),
            entity: entity.into(),
            amount: amount.map(|a| a.parse().unwrap()),
            note: note.into(),
        }
    }

    #[tokio::test]
    async fn test_full_script_lifecycle() {
        let mut runner = runner();
        let script = vec![
            command(Op::RegisterSupplier, "acme", "", None, ""),
            command(Op::RegisterAdmin, "dana", "", None, ""),
            command(Op::Profile, "acme", "", None, "DE00 1234|pay@acme.example"),
            command(Op::Submit, "acme", "batch1", None, "registration:ACME GmbH"),
            command(Op::Claim, "dana", "batch1", None, ""),
            command(Op::Verify, "dana", "batch1", None, ""),
            command(Op::Credit, "dana", "acme", Some("1000"), ""),
            command(Op::Request, "acme", "p1", Some("600"), ""),
            command(Op::Approve, "dana", "p1", None, ""),
            command(Op::Paid, "dana", "p1", None, "TXN1"),
        ];
        for cmd in script {
            runner.apply(cmd).await.unwrap();
        }

        let accounts = runner.accounts_report().await.unwrap();
        let acme = accounts.iter().find(|r| r.account == "acme").unwrap();
        assert!(acme.verified);
        assert_eq!(acme.earned, dec!(1000));
        assert_eq!(acme.available, dec!(400));

        let payouts = runner.payouts_report().await.unwrap();
        assert_eq!(payouts[0].status, "paid");
        assert_eq!(payouts[0].reference, "TXN1");
    }

    #[tokio::test]
    async fn test_unknown_handle_is_reported() {
        let mut runner = runner();
        let err = runner
            .apply(command(Op::Claim, "ghost", "batch1", None, ""))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unknown account 'ghost'"));
    }

    #[tokio::test]
    async fn test_failed_command_leaves_state_untouched() {
        let mut runner = runner();
        runner
            .apply(command(Op::RegisterSupplier, "acme", "", None, ""))
            .await
            .unwrap();
        runner
            .apply(command(Op::RegisterAdmin, "dana", "", None, ""))
            .await
            .unwrap();
        runner
            .apply(command(Op::Submit, "acme", "batch1", None, "doc:ok"))
            .await
            .unwrap();
        runner
            .apply(command(Op::Claim, "dana", "batch1", None, ""))
            .await
            .unwrap();

        // Empty rejection reason fails validation...
        let err = runner
            .apply(command(Op::Reject, "dana", "batch1", None, ""))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));

        // ...and the submission is still in review.
        let report = runner.submissions_report().await.unwrap();
        assert_eq!(report[0].status, "in_review");
    }

    #[test]
    fn test_parse_documents() {
        let docs = parse_documents("registration:ACME GmbH|tax-id:DE123");
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].name, "registration");
        assert_eq!(docs[1].content, "DE123");

        let bare = parse_documents("registration");
        assert_eq!(bare[0].name, "registration");
        assert_eq!(bare[0].content, "registration");

        assert!(parse_documents("").is_empty());
    }
}
