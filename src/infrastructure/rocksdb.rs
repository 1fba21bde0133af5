use crate::domain::account::Account;
use crate::domain::audit::{AuditEntry, EntityKind};
use crate::domain::payout::PayoutRequest;
use crate::domain::ports::{AccountStore, AuditLog, PayoutStore, SubmissionStore};
use crate::domain::submission::Submission;
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Column Family for account states.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column Family for submissions.
pub const CF_SUBMISSIONS: &str = "submissions";
/// Column Family for payout requests.
pub const CF_PAYOUTS: &str = "payouts";
/// Column Family for the append-only audit log, keyed by `seq`.
pub const CF_AUDIT: &str = "audit";

/// A persistent store implementation using RocksDB.
///
/// Handles storage for all four entity types using separate Column
/// Families. This struct is thread-safe (`Clone` shares the underlying
/// `Arc<DB>`), so one handle can back every store port.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// all required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = [CF_ACCOUNTS, CF_SUBMISSIONS, CF_PAYOUTS, CF_AUDIT]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, cfs)
            .map_err(|e| EngineError::Internal(Box::new(e)))?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &'static str) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            EngineError::Internal(
                format!("column family '{name}' not found").into(),
            )
        })
    }

    fn put_json<T: Serialize>(&self, cf: &'static str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf)?;
        let bytes = serde_json::to_vec(value).map_err(|e| EngineError::Internal(Box::new(e)))?;
        self.db
            .put_cf(cf, key, bytes)
            .map_err(|e| EngineError::Internal(Box::new(e)))
    }

    fn get_json<T: DeserializeOwned>(&self, cf: &'static str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf)?;
        let result = self
            .db
            .get_cf(cf, key)
            .map_err(|e| EngineError::Internal(Box::new(e)))?;
        match result {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| EngineError::Internal(Box::new(e)))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn scan_json<T: DeserializeOwned>(&self, cf: &'static str) -> Result<Vec<T>> {
        let cf = self.cf(cf)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, bytes) = item.map_err(|e| EngineError::Internal(Box::new(e)))?;
            let value = serde_json::from_slice(&bytes)
                .map_err(|e| EngineError::Internal(Box::new(e)))?;
            values.push(value);
        }
        Ok(values)
    }

    fn next_audit_seq(&self) -> Result<u64> {
        let cf = self.cf(CF_AUDIT)?;
        let last = self.db.iterator_cf(cf, IteratorMode::End).next();
        match last {
            Some(item) => {
                let (key, _value) = item.map_err(|e| EngineError::Internal(Box::new(e)))?;
                let bytes: [u8; 8] = key
                    .as_ref()
                    .try_into()
                    .map_err(|_| EngineError::Internal("malformed audit key".into()))?;
                Ok(u64::from_be_bytes(bytes) + 1)
            }
            None => Ok(1),
        }
    }
}

#[async_trait]
impl AccountStore for RocksDBStore {
    async fn put(&self, account: Account) -> Result<()> {
        self.put_json(CF_ACCOUNTS, account.id.as_bytes(), &account)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Account>> {
        self.get_json(CF_ACCOUNTS, id.as_bytes())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Account>> {
        let accounts: Vec<Account> = self.scan_json(CF_ACCOUNTS)?;
        Ok(accounts.into_iter().find(|a| a.name == name))
    }

    async fn all(&self) -> Result<Vec<Account>> {
        self.scan_json(CF_ACCOUNTS)
    }
}

#[async_trait]
impl SubmissionStore for RocksDBStore {
    async fn put(&self, submission: Submission) -> Result<()> {
        self.put_json(CF_SUBMISSIONS, submission.id.as_bytes(), &submission)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Submission>> {
        self.get_json(CF_SUBMISSIONS, id.as_bytes())
    }

    async fn all(&self) -> Result<Vec<Submission>> {
        self.scan_json(CF_SUBMISSIONS)
    }
}

#[async_trait]
impl PayoutStore for RocksDBStore {
    async fn put(&self, payout: PayoutRequest) -> Result<()> {
        self.put_json(CF_PAYOUTS, payout.id.as_bytes(), &payout)
    }

    async fn get(&self, id: Uuid) -> Result<Option<PayoutRequest>> {
        self.get_json(CF_PAYOUTS, id.as_bytes())
    }

    async fn for_account(&self, account_id: Uuid) -> Result<Vec<PayoutRequest>> {
        let payouts: Vec<PayoutRequest> = self.scan_json(CF_PAYOUTS)?;
        Ok(payouts
            .into_iter()
            .filter(|p| p.account_id == account_id)
            .collect())
    }

    async fn all(&self) -> Result<Vec<PayoutRequest>> {
        self.scan_json(CF_PAYOUTS)
    }
}

#[async_trait]
impl AuditLog for RocksDBStore {
    async fn append(&self, mut entry: AuditEntry) -> Result<AuditEntry> {
        entry.seq = self.next_audit_seq()?;
        self.put_json(CF_AUDIT, &entry.seq.to_be_bytes(), &entry)?;
        Ok(entry)
    }

    async fn for_entity(&self, entity: EntityKind, entity_id: Uuid) -> Result<Vec<AuditEntry>> {
        let entries: Vec<AuditEntry> = self.scan_json(CF_AUDIT)?;
        Ok(entries
            .into_iter()
            .filter(|e| e.entity == entity && e.entity_id == entity_id)
            .collect())
    }
}
