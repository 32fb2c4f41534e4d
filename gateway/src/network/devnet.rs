// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Dev Ledger
//!
//! A single-process stand-in for a consensus node, good enough to drive
//! the whole gateway end to end without a network.
//!
//! ## Pipeline
//!
//! ```text
//! 1. DECODE   — envelope under the configured passphrase
//! 2. ADMIT    — duplicate hash? known source? sequence above the last one?
//! 3. APPLY    — bump sequence, create accounts, close a ledger
//! 4. RECORD   — write the result to the core store after `close_delay`
//! 5. INGEST   — copy result and new accounts to history after `ingestion_lag`
//! ```
//!
//! Steps 4 and 5 run on a spawned task, so `submit` returns `Pending`
//! right after admission just like a real node. Setting `ingestion_lag`
//! to `None` stalls ingestion forever, which is how tests pin a result in
//! the core-only window.
//!
//! Only sequence numbers and signer sets are tracked. Balances are not.
//!
//! Duplicate detection remembers the most recent [`DEFAULT_SEEN_LIMIT`]
//! hashes; older ones are forgotten and fall back to the sequence check.
//! The per-account sequence table grows with every created account and is
//! never pruned, so a dev ledger is meant for tests and local runs, not for
//! long-lived deployments.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{LedgerNetwork, NetworkError, SubmitStatus};
use crate::account::{Account, AccountType};
use crate::envelope::{decode, OperationBody};
use crate::store::{HistoryIngest, MemoryCoreStore, ResultRecord, Signer, StoreResult};

#[derive(Debug, Clone)]
pub struct DevLedgerConfig {
    pub network_passphrase: String,
    /// Time between admission and the result appearing in the core store.
    pub close_delay: Duration,
    /// Time between the core write and history ingestion. `None` never ingests.
    pub ingestion_lag: Option<Duration>,
}

impl Default for DevLedgerConfig {
    fn default() -> Self {
        Self {
            network_passphrase: crate::config::TEST_NETWORK_PASSPHRASE.to_string(),
            close_delay: Duration::ZERO,
            ingestion_lag: Some(Duration::from_secs(1)),
        }
    }
}

/// Applied transaction hashes remembered for duplicate detection.
pub const DEFAULT_SEEN_LIMIT: usize = 100_000;

#[derive(Default)]
struct LedgerState {
    ledger: u32,
    next_account_id: u64,
    /// Last applied sequence per known account.
    sequences: HashMap<String, u64>,
    seen: HashSet<String>,
    /// Insertion order of `seen`, oldest first.
    seen_order: VecDeque<String>,
}

impl LedgerState {
    fn remember(&mut self, hash: String, limit: usize) {
        if limit == 0 {
            return;
        }
        while self.seen_order.len() >= limit {
            match self.seen_order.pop_front() {
                Some(oldest) => {
                    self.seen.remove(&oldest);
                }
                None => break,
            }
        }
        self.seen.insert(hash.clone());
        self.seen_order.push_back(hash);
    }
}

/// Result payload handed back to clients, base64(JSON) in `raw_result`.
#[derive(Serialize)]
struct AppliedResult<'a> {
    code: &'a str,
    fee_charged: u64,
    operations: Vec<&'static str>,
}

pub struct DevLedger {
    config: DevLedgerConfig,
    core: Arc<MemoryCoreStore>,
    history: Arc<dyn HistoryIngest>,
    state: Mutex<LedgerState>,
    seen_limit: usize,
    submissions: AtomicUsize,
}

impl DevLedger {
    pub fn new(
        config: DevLedgerConfig,
        core: Arc<MemoryCoreStore>,
        history: Arc<dyn HistoryIngest>,
    ) -> Self {
        Self {
            config,
            core,
            history,
            state: Mutex::new(LedgerState::default()),
            seen_limit: DEFAULT_SEEN_LIMIT,
            submissions: AtomicUsize::new(0),
        }
    }

    /// Caps how many applied hashes are kept for duplicate detection.
    pub fn with_seen_limit(mut self, limit: usize) -> Self {
        self.seen_limit = limit;
        self
    }

    /// Number of applied hashes currently remembered.
    pub fn remembered_hashes(&self) -> usize {
        self.state.lock().seen.len()
    }

    /// Creates an account out of band (genesis funding), visible in both
    /// stores immediately. Its master key is the address with weight 1.
    pub async fn register_account(
        &self,
        address: &str,
        account_type: AccountType,
    ) -> StoreResult<Account> {
        let id = {
            let mut state = self.state.lock();
            state.next_account_id += 1;
            state.sequences.entry(address.to_string()).or_insert(0);
            state.next_account_id
        };

        self.core.set_signers(address, vec![master_signer(address)]);
        let account = Account::new(id, address, account_type);
        self.history.ingest_account(account.clone()).await?;
        info!(address, account_type = %account_type, "registered dev account");
        Ok(account)
    }

    /// Number of `submit` calls received.
    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    /// Sequence of the last closed ledger.
    pub fn current_ledger(&self) -> u32 {
        self.state.lock().ledger
    }

    /// Last applied sequence number for `address`.
    pub fn sequence_of(&self, address: &str) -> Option<u64> {
        self.state.lock().sequences.get(address).copied()
    }

    fn schedule(&self, record: ResultRecord, created: Vec<Account>) {
        let core = self.core.clone();
        let history = self.history.clone();
        let close_delay = self.config.close_delay;
        let ingestion_lag = self.config.ingestion_lag;

        tokio::spawn(async move {
            if !close_delay.is_zero() {
                tokio::time::sleep(close_delay).await;
            }
            core.insert_result(record.clone());
            debug!(hash = %record.hash, ledger = record.ledger, "result recorded in core");

            let Some(lag) = ingestion_lag else {
                return;
            };
            tokio::time::sleep(lag).await;

            for account in created {
                if let Err(e) = history.ingest_account(account).await {
                    warn!(error = %e, "account ingestion failed");
                }
            }
            let hash = record.hash.clone();
            match history.ingest_result(record).await {
                Ok(()) => debug!(hash = %hash, "result ingested into history"),
                Err(e) => warn!(hash = %hash, error = %e, "result ingestion failed"),
            }
        });
    }
}

fn master_signer(address: &str) -> Signer {
    Signer {
        key: address.to_string(),
        weight: 1,
    }
}

fn reject(code: &str) -> Result<SubmitStatus, NetworkError> {
    Ok(SubmitStatus::Error {
        result: code.to_string(),
    })
}

#[async_trait]
impl LedgerNetwork for DevLedger {
    async fn submit(&self, raw_envelope: &str) -> Result<SubmitStatus, NetworkError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);

        let Ok(info) = decode(raw_envelope, &self.config.network_passphrase) else {
            return reject("tx_malformed");
        };
        let tx = &info.envelope.tx;

        let (ledger, created) = {
            let mut state = self.state.lock();

            if state.seen.contains(&info.hash) {
                return Ok(SubmitStatus::Duplicate);
            }
            let Some(&last) = state.sequences.get(&tx.source_account) else {
                return reject("tx_no_account");
            };
            if tx.seq_num <= last {
                return reject("tx_bad_seq");
            }

            state.remember(info.hash.clone(), self.seen_limit);
            state.sequences.insert(tx.source_account.clone(), tx.seq_num);
            state.ledger += 1;

            let mut created = Vec::new();
            for op in &tx.operations {
                if let OperationBody::CreateAccount { destination, .. } = &op.body {
                    if state.sequences.contains_key(destination) {
                        continue;
                    }
                    state.next_account_id += 1;
                    state.sequences.insert(destination.clone(), 0);
                    created.push(Account::new(
                        state.next_account_id,
                        destination.clone(),
                        AccountType::RegisteredUser,
                    ));
                }
            }
            (state.ledger, created)
        };

        for account in &created {
            self.core
                .set_signers(account.address.clone(), vec![master_signer(&account.address)]);
        }

        let payload = AppliedResult {
            code: "tx_success",
            fee_charged: tx.fee,
            operations: tx.operations.iter().map(|op| op.body.kind()).collect(),
        };
        let raw_result = serde_json::to_vec(&payload)
            .map(|bytes| STANDARD.encode(bytes))
            .map_err(|e| NetworkError::InvalidResponse(e.to_string()))?;

        info!(hash = %info.hash, ledger, "dev ledger applied transaction");
        self.schedule(
            ResultRecord {
                hash: info.hash.clone(),
                ledger,
                succeeded: true,
                result_code: "tx_success".to_string(),
                raw_result,
                applied_at: Utc::now(),
            },
            created,
        );

        Ok(SubmitStatus::Pending)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
