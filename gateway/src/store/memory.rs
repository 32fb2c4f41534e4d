//! In-memory store backends.
//!
//! Used by the dev ledger and by tests. Both stores count the queries they
//! serve and can be switched "offline" to simulate an outage; the history
//! store can additionally be slowed down to exercise deadlines.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{
    CoreStore, HistoryIngest, HistoryStore, ResultRecord, Signer, StoreError, StoreResult,
};
use crate::account::Account;

/// On/off switch for outage simulation.
#[derive(Debug)]
struct Health {
    name: &'static str,
    available: AtomicBool,
}

impl Health {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            available: AtomicBool::new(true),
        }
    }

    fn check(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable(format!("{} store offline", self.name)))
        }
    }
}

// ---------------------------------------------------------------------------
// Core store
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct MemoryCoreStore {
    results: RwLock<HashMap<String, ResultRecord>>,
    signers: RwLock<HashMap<String, Vec<Signer>>>,
    health: Health,
    result_queries: AtomicUsize,
    signer_queries: AtomicUsize,
}

impl Default for MemoryCoreStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCoreStore {
    pub fn new() -> Self {
        Self {
            results: RwLock::new(HashMap::new()),
            signers: RwLock::new(HashMap::new()),
            health: Health::new("core"),
            result_queries: AtomicUsize::new(0),
            signer_queries: AtomicUsize::new(0),
        }
    }

    /// Records a result. An existing record for the hash is kept.
    pub fn insert_result(&self, record: ResultRecord) {
        self.results
            .write()
            .entry(record.hash.clone())
            .or_insert(record);
    }

    pub fn set_signers(&self, address: impl Into<String>, signers: Vec<Signer>) {
        self.signers.write().insert(address.into(), signers);
    }

    pub fn set_available(&self, available: bool) {
        self.health.available.store(available, Ordering::SeqCst);
    }

    pub fn result_queries(&self) -> usize {
        self.result_queries.load(Ordering::SeqCst)
    }

    pub fn signer_queries(&self) -> usize {
        self.signer_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CoreStore for MemoryCoreStore {
    async fn find_result_by_hash(&self, hash: &str) -> StoreResult<Option<ResultRecord>> {
        self.result_queries.fetch_add(1, Ordering::SeqCst);
        self.health.check()?;
        Ok(self.results.read().get(hash).cloned())
    }

    async fn find_signers_by_address(&self, address: &str) -> StoreResult<Vec<Signer>> {
        self.signer_queries.fetch_add(1, Ordering::SeqCst);
        self.health.check()?;
        Ok(self.signers.read().get(address).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// History store
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct MemoryHistoryStore {
    accounts: RwLock<HashMap<String, Account>>,
    results: RwLock<HashMap<String, ResultRecord>>,
    health: Health,
    latency: RwLock<Option<Duration>>,
    account_queries: AtomicUsize,
    result_queries: AtomicUsize,
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            results: RwLock::new(HashMap::new()),
            health: Health::new("history"),
            latency: RwLock::new(None),
            account_queries: AtomicUsize::new(0),
            result_queries: AtomicUsize::new(0),
        }
    }

    pub fn insert_account(&self, account: Account) {
        self.accounts.write().insert(account.address.clone(), account);
    }

    /// Records a result. An existing record for the hash is kept.
    pub fn insert_result(&self, record: ResultRecord) {
        self.results
            .write()
            .entry(record.hash.clone())
            .or_insert(record);
    }

    pub fn set_available(&self, available: bool) {
        self.health.available.store(available, Ordering::SeqCst);
    }

    /// Delays every query by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write() = latency;
    }

    pub fn account_queries(&self) -> usize {
        self.account_queries.load(Ordering::SeqCst)
    }

    pub fn result_queries(&self) -> usize {
        self.result_queries.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.read();
        if let Some(d) = latency {
            tokio::time::sleep(d).await;
        }
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn find_account_by_address(&self, address: &str) -> StoreResult<Account> {
        self.account_queries.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        self.health.check()?;
        self.accounts
            .read()
            .get(address)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_result_by_hash(&self, hash: &str) -> StoreResult<Option<ResultRecord>> {
        self.result_queries.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        self.health.check()?;
        Ok(self.results.read().get(hash).cloned())
    }
}

#[async_trait]
impl HistoryIngest for MemoryHistoryStore {
    async fn ingest_account(&self, account: Account) -> StoreResult<()> {
        self.health.check()?;
        self.insert_account(account);
        Ok(())
    }

    async fn ingest_result(&self, record: ResultRecord) -> StoreResult<()> {
        self.health.check()?;
        self.insert_result(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountType;
    use chrono::Utc;

    fn record(hash: &str, code: &str) -> ResultRecord {
        ResultRecord {
            hash: hash.to_string(),
            ledger: 9,
            succeeded: code == "tx_success",
            result_code: code.to_string(),
            raw_result: String::new(),
            applied_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn core_results_are_write_once() {
        let core = MemoryCoreStore::new();
        core.insert_result(record("h", "tx_success"));
        core.insert_result(record("h", "tx_failed"));

        let found = core.find_result_by_hash("h").await.unwrap().unwrap();
        assert_eq!(found.result_code, "tx_success");
        assert_eq!(core.find_result_by_hash("other").await.unwrap(), None);
        assert_eq!(core.result_queries(), 2);
    }

    #[tokio::test]
    async fn unknown_address_has_no_signers() {
        let core = MemoryCoreStore::new();
        assert!(core.find_signers_by_address("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn offline_store_reports_unavailable() {
        let core = MemoryCoreStore::new();
        core.set_available(false);
        let err = core.find_result_by_hash("h").await.unwrap_err();
        assert!(err.is_transient());

        core.set_available(true);
        assert!(core.find_result_by_hash("h").await.is_ok());
    }

    #[tokio::test]
    async fn missing_account_is_not_found() {
        let history = MemoryHistoryStore::new();
        history.insert_account(Account::new(1, "alice", AccountType::Merchant));

        assert_eq!(
            history.find_account_by_address("alice").await.unwrap().kind(),
            Some(AccountType::Merchant)
        );
        assert_eq!(
            history.find_account_by_address("bob").await.unwrap_err(),
            StoreError::NotFound
        );
        assert_eq!(history.account_queries(), 2);
    }

    #[tokio::test]
    async fn ingest_fails_while_offline() {
        let history = MemoryHistoryStore::new();
        history.set_available(false);
        assert!(history.ingest_result(record("h", "tx_success")).await.is_err());

        history.set_available(true);
        history.ingest_result(record("h", "tx_success")).await.unwrap();
        assert!(history.find_result_by_hash("h").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_queries() {
        let history = MemoryHistoryStore::new();
        history.set_latency(Some(Duration::from_secs(5)));

        let start = tokio::time::Instant::now();
        let _ = history.find_result_by_hash("h").await;
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
