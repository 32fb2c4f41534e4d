// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Gateway Errors
//!
//! One variant per failure class a submitter can observe. What matters to
//! callers is mostly [`GatewayError::is_retryable`]:
//!
//! | Variant              | Retry?                                   |
//! |----------------------|------------------------------------------|
//! | `Malformed`          | never; fix the envelope                  |
//! | `Validation`         | not without changing the transaction     |
//! | `NetworkRejection`   | not as-is                                |
//! | `NetworkBusy`        | yes, later                               |
//! | `NetworkUnavailable` | yes, later                               |
//! | `Store`              | only if the store error is transient     |
//! | `Timeout`            | query the hash later instead of resubmit |

use thiserror::Error;

use crate::envelope::MalformedTransactionError;
use crate::network::NetworkError;
use crate::store::StoreError;
use crate::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Malformed(#[from] MalformedTransactionError),

    #[error("validation failed: {0}")]
    Validation(ValidationError),

    /// The ledger node refused the transaction; `reason` is its result
    /// code, verbatim.
    #[error("ledger rejected transaction: {reason}")]
    NetworkRejection { reason: String },

    #[error("ledger node busy, try again later")]
    NetworkBusy,

    #[error(transparent)]
    NetworkUnavailable(#[from] NetworkError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The deadline passed without a terminal result. When `submitted` is
    /// set the transaction may still apply; poll `hash` later.
    #[error("no result for {hash} before the deadline")]
    Timeout { hash: String, submitted: bool },
}

impl From<ValidationError> for GatewayError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::Store(store) => Self::Store(store),
            other => Self::Validation(other),
        }
    }
}

impl GatewayError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Malformed(_) | Self::Validation(_) | Self::NetworkRejection { .. } => false,
            Self::NetworkBusy | Self::NetworkUnavailable(_) | Self::Timeout { .. } => true,
            Self::Store(e) => e.is_transient(),
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed",
            Self::Validation(_) => "validation",
            Self::NetworkRejection { .. } => "network_rejection",
            Self::NetworkBusy => "network_busy",
            Self::NetworkUnavailable(_) => "network_unavailable",
            Self::Store(_) => "store",
            Self::Timeout { .. } => "timeout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_store_errors_are_store_errors() {
        let err: GatewayError =
            ValidationError::Store(StoreError::Unavailable("down".into())).into();
        assert!(matches!(err, GatewayError::Store(_)));
        assert!(err.is_retryable());

        let err: GatewayError = ValidationError::NoOperations.into();
        assert_eq!(err, GatewayError::Validation(ValidationError::NoOperations));
        assert!(!err.is_retryable());
    }

    #[test]
    fn retry_classification() {
        let malformed = GatewayError::Malformed(MalformedTransactionError {
            raw: "x".into(),
            reason: "bad".into(),
        });
        assert!(!malformed.is_retryable());
        assert!(!GatewayError::NetworkRejection {
            reason: "tx_bad_seq".into()
        }
        .is_retryable());
        assert!(GatewayError::NetworkBusy.is_retryable());
        assert!(GatewayError::Timeout {
            hash: "h".into(),
            submitted: true
        }
        .is_retryable());
        assert!(!GatewayError::Store(StoreError::Corrupt("x".into())).is_retryable());
    }

    #[test]
    fn rejection_reason_is_verbatim() {
        let err = GatewayError::NetworkRejection {
            reason: "tx_insufficient_fee".into(),
        };
        assert_eq!(err.to_string(), "ledger rejected transaction: tx_insufficient_fee");
        assert_eq!(err.kind(), "network_rejection");
    }
}
