// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ledger Network
//!
//! The seam between the gateway and the consensus node it forwards
//! envelopes to. The gateway only needs one call: hand over the raw
//! envelope and learn whether the node took it.
//!
//! ```text
//! devnet.rs  — in-process ledger behind `harbor-node run` and the tests
//! ```
//!
//! A real deployment plugs an HTTP client to its core node in behind
//! [`LedgerNetwork`]; the coordinator does not care which.

pub mod devnet;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use devnet::{DevLedger, DevLedgerConfig};

/// How the ledger node answered a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitStatus {
    /// Accepted into the node's queue; the outcome comes later.
    Pending,
    /// The node already has this hash queued or applied.
    Duplicate,
    /// The node is overloaded. Nothing was queued.
    TryAgainLater,
    /// Deterministic refusal, e.g. `tx_bad_seq` or `tx_insufficient_fee`.
    Error { result: String },
}

impl SubmitStatus {
    /// Whether the transaction is now (or already was) in the node's hands.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Pending | Self::Duplicate)
    }
}

/// The node could not be asked at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("ledger node unreachable: {0}")]
    Unreachable(String),

    #[error("unexpected ledger node response: {0}")]
    InvalidResponse(String),
}

/// Submission endpoint of a ledger node.
#[async_trait]
pub trait LedgerNetwork: Send + Sync {
    async fn submit(&self, raw_envelope: &str) -> Result<SubmitStatus, NetworkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_statuses() {
        assert!(SubmitStatus::Pending.is_accepted());
        assert!(SubmitStatus::Duplicate.is_accepted());
        assert!(!SubmitStatus::TryAgainLater.is_accepted());
        assert!(!SubmitStatus::Error {
            result: "tx_bad_seq".into()
        }
        .is_accepted());
    }

    #[test]
    fn status_serializes_with_tag() {
        let json = serde_json::to_string(&SubmitStatus::Error {
            result: "tx_bad_seq".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"error","result":"tx_bad_seq"}"#);
    }
}
