// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Account Cache
//!
//! Read-through LRU cache in front of
//! [`HistoryStore::find_account_by_address`].
//!
//! Entries sit in an [`lru::LruCache`] behind one `parking_lot` mutex. The
//! lock is taken for the lookup and for the insert, never across the store
//! query, so a slow history store does not block hits on other addresses.
//!
//! Two tasks missing on the same address both query the store and both
//! insert; accounts are immutable once created, so the second insert
//! overwrites an identical value.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use super::types::Account;
use crate::config::CacheConfig;
use crate::store::{HistoryStore, StoreError, StoreResult};

/// Cached lookups by address. `None` records a confirmed absence.
type Entries = LruCache<String, Option<Account>>;

/// Counters exposed for metrics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
}

pub struct AccountCache {
    store: Arc<dyn HistoryStore>,
    /// `None` when the configured capacity is zero.
    entries: Option<Mutex<Entries>>,
    cache_negatives: bool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AccountCache {
    pub fn new(store: Arc<dyn HistoryStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            entries: NonZeroUsize::new(config.capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            cache_negatives: config.cache_negatives,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the account for `address`, querying the store on a miss.
    ///
    /// Store errors, `NotFound` included, are returned as the store
    /// produced them.
    pub async fn get(&self, address: &str) -> StoreResult<Account> {
        let cached = self
            .entries
            .as_ref()
            .and_then(|entries| entries.lock().get(address).cloned());

        if let Some(value) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(address, negative = value.is_none(), "account cache hit");
            return value.ok_or(StoreError::NotFound);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(address, "account cache miss");

        match self.store.find_account_by_address(address).await {
            Ok(account) => {
                self.insert(address, Some(account.clone()));
                Ok(account)
            }
            Err(StoreError::NotFound) => {
                if self.cache_negatives {
                    self.insert(address, None);
                }
                Err(StoreError::NotFound)
            }
            Err(e) => Err(e),
        }
    }

    /// Whether `address` is cached, without counting as an access.
    pub fn contains(&self, address: &str) -> bool {
        self.entries
            .as_ref()
            .is_some_and(|entries| entries.lock().contains(address))
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |entries| entries.lock().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries
            .as_ref()
            .map_or(0, |entries| entries.lock().cap().get())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len: self.len(),
        }
    }

    fn insert(&self, address: &str, value: Option<Account>) {
        let Some(entries) = &self.entries else {
            return;
        };
        if let Some((evicted, _)) = entries.lock().push(address.to_string(), value) {
            if evicted != address {
                debug!(address = %evicted, "evicting account");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountType;
    use crate::store::MemoryHistoryStore;

    fn setup(capacity: usize, cache_negatives: bool) -> (Arc<MemoryHistoryStore>, AccountCache) {
        let store = Arc::new(MemoryHistoryStore::new());
        for (i, name) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            store.insert_account(Account::new(i as u64, *name, AccountType::RegisteredUser));
        }
        let cache = AccountCache::new(
            store.clone(),
            &CacheConfig {
                capacity,
                cache_negatives,
            },
        );
        (store, cache)
    }

    #[tokio::test]
    async fn repeated_gets_query_store_once() {
        let (store, cache) = setup(10, false);

        let first = cache.get("a").await.unwrap();
        for _ in 0..5 {
            assert_eq!(cache.get("a").await.unwrap(), first);
        }

        assert_eq!(store.account_queries(), 1);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 5,
                misses: 1,
                len: 1
            }
        );
    }

    #[tokio::test]
    async fn evicts_least_recently_accessed() {
        let (_, cache) = setup(3, false);
        cache.get("a").await.unwrap();
        cache.get("b").await.unwrap();
        cache.get("c").await.unwrap();

        // Touch "a" so "b" becomes the oldest.
        cache.get("a").await.unwrap();
        cache.get("d").await.unwrap();

        assert_eq!(cache.len(), 3);
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
        assert!(cache.contains("d"));
    }

    #[tokio::test]
    async fn misses_are_not_cached_by_default() {
        let (store, cache) = setup(10, false);
        for _ in 0..3 {
            assert_eq!(cache.get("zed").await.unwrap_err(), StoreError::NotFound);
        }
        assert_eq!(store.account_queries(), 3);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn negative_caching_when_enabled() {
        let (store, cache) = setup(10, true);
        for _ in 0..3 {
            assert_eq!(cache.get("zed").await.unwrap_err(), StoreError::NotFound);
        }
        assert_eq!(store.account_queries(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn store_errors_pass_through_uncached() {
        let (store, cache) = setup(10, true);
        store.set_available(false);

        let err = cache.get("a").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(cache.is_empty());

        store.set_available(true);
        assert!(cache.get("a").await.is_ok());
    }

    #[tokio::test]
    async fn zero_capacity_disables_caching() {
        let (store, cache) = setup(0, false);
        cache.get("a").await.unwrap();
        cache.get("a").await.unwrap();
        assert_eq!(store.account_queries(), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_gets_stay_within_capacity() {
        let (_, cache) = setup(2, false);
        let cache = Arc::new(cache);

        let tasks: Vec<_> = (0..40)
            .map(|i| {
                let cache = cache.clone();
                let key = ["a", "b", "c", "d", "e"][i % 5];
                tokio::spawn(async move { cache.get(key).await })
            })
            .collect();

        for result in futures::future::join_all(tasks).await {
            assert!(result.unwrap().is_ok());
        }
        assert!(cache.len() <= 2);
        assert_eq!(cache.stats().hits + cache.stats().misses, 40);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_distinct_misses_fill_exactly_to_capacity() {
        let store = Arc::new(MemoryHistoryStore::new());
        let addresses: Vec<String> = (0..400).map(|i| format!("acct-{i}")).collect();
        for (i, address) in addresses.iter().enumerate() {
            store.insert_account(Account::new(i as u64, address.as_str(), AccountType::Merchant));
        }

        for _ in 0..20 {
            let cache = Arc::new(AccountCache::new(
                store.clone(),
                &CacheConfig {
                    capacity: 64,
                    cache_negatives: false,
                },
            ));
            let tasks: Vec<_> = addresses
                .iter()
                .cloned()
                .map(|address| {
                    let cache = cache.clone();
                    tokio::spawn(async move { cache.get(&address).await })
                })
                .collect();

            for result in futures::future::join_all(tasks).await {
                assert!(result.unwrap().is_ok());
            }
            assert_eq!(cache.len(), 64);
            assert_eq!(cache.capacity(), 64);
            assert_eq!(cache.stats().misses, 400);
        }
    }

    #[tokio::test]
    async fn contains_does_not_refresh_recency() {
        let (_, cache) = setup(2, false);
        cache.get("a").await.unwrap();
        cache.get("b").await.unwrap();

        assert!(cache.contains("a"));
        cache.get("c").await.unwrap();

        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
    }
}
