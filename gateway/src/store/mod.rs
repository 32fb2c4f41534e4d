//! # Store Contracts
//!
//! The gateway reads from two stores it does not own:
//!
//! ```text
//! core store     written by the ledger at close time; results + signers
//! history store  filled asynchronously by ingestion; accounts + results
//! ```
//!
//! The core store answers sooner, the history store answers more. Neither
//! is authoritative alone during the ingestion lag, which is why result
//! lookups go through [`crate::resolver::ResultResolver`].
//!
//! Backends:
//!
//! - [`memory`]: in-process maps with outage injection.
//! - [`sled_store`]: persistent history store on sled trees.

pub mod error;
pub mod memory;
pub mod sled_store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::Account;

pub use error::{StoreError, StoreResult};
pub use memory::{MemoryCoreStore, MemoryHistoryStore};
pub use sled_store::SledHistoryStore;

/// A transaction outcome as recorded by a store.
///
/// Once written for a hash it is never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub hash: String,
    /// Ledger sequence the transaction was applied in.
    pub ledger: u32,
    pub succeeded: bool,
    /// Short result code, e.g. `tx_success` or `tx_bad_seq`.
    pub result_code: String,
    /// Result payload exactly as the ledger produced it.
    pub raw_result: String,
    pub applied_at: DateTime<Utc>,
}

/// A key allowed to sign for an account, with its weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    /// Signer public key as an account address.
    pub key: String,
    pub weight: u32,
}

/// Execution-time store.
#[async_trait]
pub trait CoreStore: Send + Sync {
    /// `Ok(None)` when the hash has not been applied (yet).
    async fn find_result_by_hash(&self, hash: &str) -> StoreResult<Option<ResultRecord>>;

    /// Signers of `address`; empty when the account does not exist.
    async fn find_signers_by_address(&self, address: &str) -> StoreResult<Vec<Signer>>;
}

/// Query-optimised store populated by ingestion.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Fails with [`StoreError::NotFound`] when no account has `address`.
    async fn find_account_by_address(&self, address: &str) -> StoreResult<Account>;

    /// `Ok(None)` when the hash has not been ingested (yet).
    async fn find_result_by_hash(&self, hash: &str) -> StoreResult<Option<ResultRecord>>;
}

/// Write side of the history store, used by ingestion.
#[async_trait]
pub trait HistoryIngest: Send + Sync {
    async fn ingest_account(&self, account: Account) -> StoreResult<()>;

    /// Ingesting the same hash twice keeps the first record.
    async fn ingest_result(&self, record: ResultRecord) -> StoreResult<()>;
}
