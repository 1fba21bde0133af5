use crate::domain::account::Account;
use crate::domain::audit::{AuditEntry, EntityKind};
use crate::domain::payout::PayoutRequest;
use crate::domain::ports::{AccountStore, AuditLog, PayoutStore, SubmissionStore};
use crate::domain::submission::Submission;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A thread-safe in-memory store for accounts.
///
/// Uses `Arc<RwLock<HashMap>>` to allow shared concurrent access. Ideal for
/// testing or single-process deployments where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn put(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        accounts.insert(account.id, account);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.name == name).cloned())
    }

    async fn all(&self) -> Result<Vec<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().cloned().collect())
    }
}

/// A thread-safe in-memory store for submissions.
#[derive(Default, Clone)]
pub struct InMemorySubmissionStore {
    submissions: Arc<RwLock<HashMap<Uuid, Submission>>>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn put(&self, submission: Submission) -> Result<()> {
        let mut submissions = self.submissions.write().await;
        submissions.insert(submission.id, submission);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Submission>> {
        let submissions = self.submissions.read().await;
        Ok(submissions.get(&id).cloned())
    }

    async fn all(&self) -> Result<Vec<Submission>> {
        let submissions = self.submissions.read().await;
        Ok(submissions.values().cloned().collect())
    }
}

/// A thread-safe in-memory store for payout requests.
#[derive(Default, Clone)]
pub struct InMemoryPayoutStore {
    payouts: Arc<RwLock<HashMap<Uuid, PayoutRequest>>>,
}

impl InMemoryPayoutStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PayoutStore for InMemoryPayoutStore {
    async fn put(&self, payout: PayoutRequest) -> Result<()> {
        let mut payouts = self.payouts.write().await;
        payouts.insert(payout.id, payout);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<PayoutRequest>> {
        let payouts = self.payouts.read().await;
        Ok(payouts.get(&id).cloned())
    }

    async fn for_account(&self, account_id: Uuid) -> Result<Vec<PayoutRequest>> {
        let payouts = self.payouts.read().await;
        Ok(payouts
            .values()
            .filter(|p| p.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn all(&self) -> Result<Vec<PayoutRequest>> {
        let payouts = self.payouts.read().await;
        Ok(payouts.values().cloned().collect())
    }
}

/// An append-only in-memory audit log. `append` assigns the next `seq`
/// under the write lock, so entries are strictly ordered.
#[derive(Default, Clone)]
pub struct InMemoryAuditLog {
    entries: Arc<RwLock<Vec<AuditEntry>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn append(&self, mut entry: AuditEntry) -> Result<AuditEntry> {
        let mut entries = self.entries.write().await;
        entry.seq = entries.len() as u64 + 1;
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn for_entity(&self, entity: EntityKind, entity_id: Uuid) -> Result<Vec<AuditEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| e.entity == entity && e.entity_id == entity_id)
            .cloned()
            .collect())
    }
}
