//! Submission review state machine.
//!
//! `pending → in_review → {verified, rejected}`, with `in_review → pending`
//! when the claiming admin releases. Terminal states admit no transition.
//! The `reviewer` field is the review lock: only the admin recorded there
//! may verify, reject or release.

use crate::application::auth::{Action, Actor, authorize};
use crate::application::engine::Engine;
use crate::domain::account::Verification;
use crate::domain::audit::{AuditEntry, EntityKind};
use crate::domain::submission::{Document, Submission, SubmissionStatus};
use crate::error::{EngineError, Result};
use chrono::Utc;
use uuid::Uuid;

impl Engine {
    /// Supplier files a registration batch for their own account.
    pub async fn submit(
        &self,
        actor: &Actor,
        account_id: Uuid,
        documents: Vec<Document>,
    ) -> Result<Submission> {
        authorize(actor, Action::SubmitBatch, Some(account_id))?;
        let account = self.require_account(account_id).await?;
        if !account.is_active() {
            return Err(EngineError::validation(
                "deactivated accounts cannot submit batches",
            ));
        }

        let submission = Submission::new(account_id, documents)?;
        self.submissions.put(submission.clone()).await?;
        self.audit
            .append(AuditEntry::transition(
                EntityKind::Submission,
                submission.id,
                actor.id,
                None,
                SubmissionStatus::Pending.as_str(),
                None,
            ))
            .await?;
        tracing::info!(submission = %submission.id, account = %account_id, "batch submitted");
        Ok(submission)
    }

    /// Admin takes the review lock: `pending → in_review`.
    ///
    /// Re-claiming by the admin already holding the lock returns the current
    /// state unchanged; a claim against another admin's lock fails with
    /// `AlreadyClaimed`.
    pub async fn claim(&self, actor: &Actor, submission_id: Uuid) -> Result<Submission> {
        authorize(actor, Action::ClaimReview, None)?;
        let _guard = self.submission_locks.lock(submission_id).await;

        let mut submission = self.require_submission(submission_id).await?;
        match submission.status {
            SubmissionStatus::InReview => {
                return match submission.reviewer {
                    Some(reviewer) if reviewer == actor.id => Ok(submission),
                    Some(reviewer) => Err(EngineError::AlreadyClaimed {
                        submission: submission_id,
                        reviewer,
                    }),
                    None => Err(EngineError::Internal(
                        format!("submission {submission_id} is in review without a reviewer")
                            .into(),
                    )),
                };
            }
            SubmissionStatus::Pending => {}
            status => {
                return Err(EngineError::InvalidTransition {
                    entity: "submission",
                    from: status.as_str().into(),
                    action: "claim",
                });
            }
        }

        submission.status = SubmissionStatus::InReview;
        submission.reviewer = Some(actor.id);
        submission.claimed_at = Some(Utc::now());
        self.submissions.put(submission.clone()).await?;
        self.audit
            .append(AuditEntry::transition(
                EntityKind::Submission,
                submission_id,
                actor.id,
                Some(SubmissionStatus::Pending.as_str()),
                SubmissionStatus::InReview.as_str(),
                None,
            ))
            .await?;
        tracing::info!(submission = %submission_id, admin = %actor.id, "review claimed");
        Ok(submission)
    }

    /// Claiming admin verifies the batch: `in_review → verified`.
    ///
    /// Also flips the owning account to `Verified`, which is what makes the
    /// supplier payout-eligible. Both entities get audit entries.
    pub async fn verify(
        &self,
        actor: &Actor,
        submission_id: Uuid,
        notes: Option<String>,
    ) -> Result<Submission> {
        authorize(actor, Action::VerifySubmission, None)?;
        let _guard = self.submission_locks.lock(submission_id).await;

        let mut submission = self.require_submission(submission_id).await?;
        self.check_review_lock(&submission, actor, "verify")?;

        let _account_guard = self.account_locks.lock(submission.account_id).await;
        let mut account = self.require_account(submission.account_id).await?;
        let was_verified = account.is_verified();

        submission.status = SubmissionStatus::Verified;
        submission.review_note = notes;
        submission.decided_at = Some(Utc::now());
        account.verification = Verification::Verified;

        self.submissions.put(submission.clone()).await?;
        self.accounts.put(account).await?;
        self.audit
            .append(AuditEntry::transition(
                EntityKind::Submission,
                submission_id,
                actor.id,
                Some(SubmissionStatus::InReview.as_str()),
                SubmissionStatus::Verified.as_str(),
                None,
            ))
            .await?;
        if !was_verified {
            self.audit
                .append(AuditEntry::transition(
                    EntityKind::Account,
                    submission.account_id,
                    actor.id,
                    Some("unverified"),
                    "verified",
                    None,
                ))
                .await?;
        }
        tracing::info!(submission = %submission_id, admin = %actor.id, "submission verified");
        Ok(submission)
    }

    /// Claiming admin rejects the batch: `in_review → rejected`.
    ///
    /// The reason is mandatory and stored; the account's verification status
    /// is untouched, since it reflects the most recent verified submission.
    pub async fn reject(
        &self,
        actor: &Actor,
        submission_id: Uuid,
        reason: &str,
    ) -> Result<Submission> {
        authorize(actor, Action::RejectSubmission, None)?;
        if reason.trim().is_empty() {
            return Err(EngineError::validation("rejection reason must not be empty"));
        }
        let _guard = self.submission_locks.lock(submission_id).await;

        let mut submission = self.require_submission(submission_id).await?;
        self.check_review_lock(&submission, actor, "reject")?;

        submission.status = SubmissionStatus::Rejected;
        submission.rejection_reason = Some(reason.to_string());
        submission.decided_at = Some(Utc::now());
        self.submissions.put(submission.clone()).await?;
        self.audit
            .append(AuditEntry::transition(
                EntityKind::Submission,
                submission_id,
                actor.id,
                Some(SubmissionStatus::InReview.as_str()),
                SubmissionStatus::Rejected.as_str(),
                Some(reason.to_string()),
            ))
            .await?;
        tracing::info!(submission = %submission_id, admin = %actor.id, reason, "submission rejected");
        Ok(submission)
    }

    /// Claiming admin abandons the review: `in_review → pending`.
    pub async fn release(&self, actor: &Actor, submission_id: Uuid) -> Result<Submission> {
        authorize(actor, Action::ReleaseReview, None)?;
        let _guard = self.submission_locks.lock(submission_id).await;

        let mut submission = self.require_submission(submission_id).await?;
        self.check_review_lock(&submission, actor, "release")?;

        submission.status = SubmissionStatus::Pending;
        submission.reviewer = None;
        submission.claimed_at = None;
        self.submissions.put(submission.clone()).await?;
        self.audit
            .append(AuditEntry::transition(
                EntityKind::Submission,
                submission_id,
                actor.id,
                Some(SubmissionStatus::InReview.as_str()),
                SubmissionStatus::Pending.as_str(),
                None,
            ))
            .await?;
        tracing::info!(submission = %submission_id, admin = %actor.id, "review released");
        Ok(submission)
    }

    /// A decision requires the submission to be in review and the actor to
    /// hold the lock.
    fn check_review_lock(
        &self,
        submission: &Submission,
        actor: &Actor,
        action: &'static str,
    ) -> Result<()> {
        if submission.status != SubmissionStatus::InReview {
            return Err(EngineError::InvalidTransition {
                entity: "submission",
                from: submission.status.as_str().into(),
                action,
            });
        }
        match submission.reviewer {
            Some(reviewer) if reviewer == actor.id => Ok(()),
            Some(reviewer) => Err(EngineError::AlreadyClaimed {
                submission: submission.id,
                reviewer,
            }),
            None => Err(EngineError::Internal(
                format!("submission {} is in review without a reviewer", submission.id).into(),
            )),
        }
    }
}
