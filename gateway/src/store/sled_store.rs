//! # Persistent History Store
//!
//! A [`HistoryStore`] on sled, for nodes that should remember what they
//! ingested across restarts.
//!
//! ## Tree Layout
//!
//! | Tree       | Key                 | Value                  |
//! |------------|---------------------|------------------------|
//! | `accounts` | `address` (UTF-8)   | `bincode(Account)`     |
//! | `results`  | `hash` (UTF-8 hex)  | `bincode(ResultRecord)`|
//!
//! Results are write-once: ingestion uses compare-and-swap against an
//! empty slot, so a replayed ingestion never overwrites the first record.

use std::path::Path;

use async_trait::async_trait;
use sled::{Db, Tree};
use tracing::debug;

use super::{HistoryIngest, HistoryStore, ResultRecord, StoreError, StoreResult};
use crate::account::Account;

#[derive(Debug, Clone)]
pub struct SledHistoryStore {
    db: Db,
    accounts: Tree,
    results: Tree,
}

impl SledHistoryStore {
    /// Open or create a store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// A store that lives only as long as the handle.
    pub fn open_temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> StoreResult<Self> {
        let accounts = db.open_tree("accounts")?;
        let results = db.open_tree("results")?;
        Ok(Self {
            db,
            accounts,
            results,
        })
    }

    /// Number of ingested results.
    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub async fn flush(&self) -> StoreResult<()> {
        self.db.flush_async().await?;
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for SledHistoryStore {
    async fn find_account_by_address(&self, address: &str) -> StoreResult<Account> {
        let bytes = self
            .accounts
            .get(address.as_bytes())?
            .ok_or(StoreError::NotFound)?;
        Ok(bincode::deserialize(&bytes)?)
    }

    async fn find_result_by_hash(&self, hash: &str) -> StoreResult<Option<ResultRecord>> {
        match self.results.get(hash.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl HistoryIngest for SledHistoryStore {
    async fn ingest_account(&self, account: Account) -> StoreResult<()> {
        let bytes = bincode::serialize(&account)?;
        self.accounts.insert(account.address.as_bytes(), bytes)?;
        Ok(())
    }

    async fn ingest_result(&self, record: ResultRecord) -> StoreResult<()> {
        let bytes = bincode::serialize(&record)?;
        let swapped = self
            .results
            .compare_and_swap(record.hash.as_bytes(), None as Option<&[u8]>, Some(bytes))?;
        if swapped.is_err() {
            debug!(hash = %record.hash, "result already ingested");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
