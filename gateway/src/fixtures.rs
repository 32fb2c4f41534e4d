//! Shared helpers for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::config::TEST_NETWORK_PASSPHRASE;
use crate::crypto::Keypair;
use crate::envelope::{decode, encode, sign_envelope, Asset, EnvelopeBuilder, EnvelopeInfo, OperationBody};
use crate::network::{LedgerNetwork, NetworkError, SubmitStatus};
use crate::store::{ResultRecord, Signer};

/// Deterministic keypair number `n`.
pub fn keypair(n: u8) -> Keypair {
    Keypair::from_seed(&[n; 32])
}

pub fn master_signer(address: &str) -> Signer {
    Signer {
        key: address.to_string(),
        weight: 1,
    }
}

/// A native payment from `from` to `to`, signed by `from` on the test network.
pub fn signed_payment(from: &Keypair, to: &str, seq: u64) -> String {
    let mut env = EnvelopeBuilder::new(from.address())
        .sequence(seq)
        .operation(OperationBody::Payment {
            destination: to.to_string(),
            asset: Asset::Native,
            amount: 25,
        })
        .build();
    sign_envelope(&mut env, TEST_NETWORK_PASSPHRASE, from).unwrap();
    encode(&env).unwrap()
}

pub fn unsigned_payment_info(seq: u64) -> EnvelopeInfo {
    let env = EnvelopeBuilder::new(keypair(1).address())
        .sequence(seq)
        .operation(OperationBody::Payment {
            destination: keypair(2).address(),
            asset: Asset::Native,
            amount: 25,
        })
        .build();
    decode(&encode(&env).unwrap(), TEST_NETWORK_PASSPHRASE).unwrap()
}

pub fn result_record(hash: &str, ledger: u32, succeeded: bool) -> ResultRecord {
    ResultRecord {
        hash: hash.to_string(),
        ledger,
        succeeded,
        result_code: if succeeded { "tx_success" } else { "tx_failed" }.to_string(),
        raw_result: String::new(),
        applied_at: Utc.timestamp_opt(1_767_225_600, 0).unwrap(),
    }
}

/// Ledger network double answering every submission the same way.
pub struct ScriptedNetwork {
    status: SubmitStatus,
    unreachable: AtomicBool,
    calls: AtomicUsize,
}

impl ScriptedNetwork {
    pub fn new(status: SubmitStatus) -> Self {
        Self {
            status,
            unreachable: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerNetwork for ScriptedNetwork {
    async fn submit(&self, _raw_envelope: &str) -> Result<SubmitStatus, NetworkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(NetworkError::Unreachable("connection refused".into()));
        }
        Ok(self.status.clone())
    }
}
