//! Store traits and their boxed aliases.
//!
//! Backends (in-memory, RocksDB) implement these traits; the engine and
//! query layer only ever see the trait objects, so a real database can sit
//! underneath without touching engine logic.

use super::account::Account;
use super::audit::{AuditEntry, EntityKind};
use super::payout::PayoutRequest;
use super::submission::Submission;
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn put(&self, account: Account) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Account>>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Account>>;
    async fn all(&self) -> Result<Vec<Account>>;
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn put(&self, submission: Submission) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Submission>>;
    async fn all(&self) -> Result<Vec<Submission>>;
}

#[async_trait]
pub trait PayoutStore: Send + Sync {
    async fn put(&self, payout: PayoutRequest) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<PayoutRequest>>;
    /// Full payout history for one account, in no particular order.
    async fn for_account(&self, account_id: Uuid) -> Result<Vec<PayoutRequest>>;
    async fn all(&self) -> Result<Vec<PayoutRequest>>;
}

/// Append-only log; `append` assigns the entry's `seq`.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, entry: AuditEntry) -> Result<AuditEntry>;
    async fn for_entity(&self, entity: EntityKind, entity_id: Uuid) -> Result<Vec<AuditEntry>>;
}

pub type AccountStoreBox = Box<dyn AccountStore>;
pub type SubmissionStoreBox = Box<dyn SubmissionStore>;
pub type PayoutStoreBox = Box<dyn PayoutStore>;
pub type AuditLogBox = Box<dyn AuditLog>;
