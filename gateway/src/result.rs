// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! The caller-facing answer to "what happened to transaction X".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::ResultRecord;

/// Which store produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    History,
    Core,
    None,
}

impl ResultSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::History => "history",
            Self::Core => "core",
            Self::None => "none",
        }
    }
}

/// Outcome of a transaction, keyed by content hash.
///
/// `found = false` means neither store knows the hash yet. It is not an
/// error: the transaction may still be in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub hash: String,
    pub found: bool,
    pub succeeded: bool,
    /// Ledger the transaction was applied in.
    pub ledger: Option<u32>,
    pub result_code: Option<String>,
    /// Result payload as recorded by the ledger.
    pub raw_result: Option<String>,
    /// Set when the transaction was applied but failed.
    pub error: Option<String>,
    pub applied_at: Option<DateTime<Utc>>,
    pub source: ResultSource,
}

impl SubmissionResult {
    pub fn not_found(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            found: false,
            succeeded: false,
            ledger: None,
            result_code: None,
            raw_result: None,
            error: None,
            applied_at: None,
            source: ResultSource::None,
        }
    }

    pub fn from_record(record: ResultRecord, source: ResultSource) -> Self {
        let error = (!record.succeeded).then(|| record.result_code.clone());
        Self {
            hash: record.hash,
            found: true,
            succeeded: record.succeeded,
            ledger: Some(record.ledger),
            result_code: Some(record.result_code),
            raw_result: Some(record.raw_result),
            error,
            applied_at: Some(record.applied_at),
            source,
        }
    }
}
