// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Result Resolver
//!
//! Answers "what happened to hash H" from two eventually consistent
//! stores:
//!
//! ```text
//!   history ──found──▶ ViaHistory
//!      │
//!   missing / down
//!      ▼
//!    core ────found──▶ ViaCore        (ingestion lag window)
//!      │
//!   missing ─────────▶ Absent          (keep waiting)
//! ```
//!
//! A store error only surfaces when the other store had nothing to offer.
//! When both are down the history error is reported. Results are
//! write-once in both stores, so once a hash resolves it stays resolved.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::result::{ResultSource, SubmissionResult};
use crate::store::{CoreStore, HistoryStore, ResultRecord, StoreError, StoreResult};

/// Where a result was found, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Absent,
    ViaHistory(ResultRecord),
    ViaCore(ResultRecord),
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    pub fn source(&self) -> ResultSource {
        match self {
            Self::Absent => ResultSource::None,
            Self::ViaHistory(_) => ResultSource::History,
            Self::ViaCore(_) => ResultSource::Core,
        }
    }

    pub fn into_result(self, hash: &str) -> SubmissionResult {
        match self {
            Self::Absent => SubmissionResult::not_found(hash),
            Self::ViaHistory(r) => SubmissionResult::from_record(r, ResultSource::History),
            Self::ViaCore(r) => SubmissionResult::from_record(r, ResultSource::Core),
        }
    }
}

#[derive(Clone)]
pub struct ResultResolver {
    core: Arc<dyn CoreStore>,
    history: Arc<dyn HistoryStore>,
}

/// A store's `NotFound` on a result query means the same as `Ok(None)`.
fn absent_as_none(r: StoreResult<Option<ResultRecord>>) -> StoreResult<Option<ResultRecord>> {
    match r {
        Err(StoreError::NotFound) => Ok(None),
        other => other,
    }
}

impl ResultResolver {
    pub fn new(core: Arc<dyn CoreStore>, history: Arc<dyn HistoryStore>) -> Self {
        Self { core, history }
    }

    pub async fn resolve(&self, hash: &str) -> StoreResult<Resolution> {
        let history_error = match absent_as_none(self.history.find_result_by_hash(hash).await) {
            Ok(Some(record)) => {
                debug!(hash, "resolved via history");
                return Ok(Resolution::ViaHistory(record));
            }
            Ok(None) => None,
            Err(e) => {
                warn!(hash, error = %e, "history store failed, falling back to core");
                Some(e)
            }
        };

        match absent_as_none(self.core.find_result_by_hash(hash).await) {
            Ok(Some(record)) => {
                debug!(hash, ledger = record.ledger, "resolved via core");
                Ok(Resolution::ViaCore(record))
            }
            Ok(None) => match history_error {
                Some(e) => Err(e),
                None => {
                    debug!(hash, "not found in either store");
                    Ok(Resolution::Absent)
                }
            },
            Err(core_error) => {
                warn!(hash, error = %core_error, "core store failed");
                Err(history_error.unwrap_or(core_error))
            }
        }
    }

    /// [`Self::resolve`] flattened into the caller-facing shape.
    pub async fn result_by_hash(&self, hash: &str) -> StoreResult<SubmissionResult> {
        Ok(self.resolve(hash).await?.into_result(hash))
    }
}
