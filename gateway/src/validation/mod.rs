// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Validator Chain
//!
//! Business-rule admission control. A [`ValidatorChain`] runs an ordered
//! list of [`Validator`]s against a decoded envelope; the first failure
//! wins and the envelope never reaches the network.
//!
//! The standard chain, cheapest check first:
//!
//! ```text
//! 1. structure      op count, fee floor, sequence, address syntax
//! 2. signature      signer weights from the core store
//! 3. account_type   source/destination role compatibility
//! ```
//!
//! Validators hold no per-request state and are shared across concurrent
//! submissions behind `Arc`.

pub mod account_type;
pub mod signature;
pub mod structure;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::account::{AccountCache, AccountType};
use crate::config::ValidationConfig;
use crate::envelope::EnvelopeInfo;
use crate::store::{CoreStore, StoreError};

pub use account_type::AccountTypeValidator;
pub use signature::SignatureValidator;
pub use structure::StructureValidator;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why an envelope was refused before submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(
        "{} account {source_account} may not pay {} account {destination_account}",
        type_label(.source_type),
        type_label(.destination_type)
    )]
    AccountTypeMismatch {
        source_account: String,
        destination_account: String,
        source_type: i32,
        destination_type: i32,
    },

    #[error("account {address} does not exist")]
    UnknownAccount { address: String },

    #[error("transaction has no operations")]
    NoOperations,

    #[error("transaction has {count} operations, limit is {max}")]
    TooManyOperations { count: usize, max: usize },

    #[error("fee {fee} below required {required}")]
    FeeTooLow { fee: u64, required: u64 },

    #[error("sequence number must be positive")]
    InvalidSequence,

    #[error("malformed account address: {address}")]
    InvalidAddress { address: String },

    #[error("account {address} signed with weight {weight}, needs {required}")]
    InsufficientSignatureWeight {
        address: String,
        weight: u32,
        required: u32,
    },

    #[error("store error during validation: {0}")]
    Store(#[from] StoreError),
}

impl ValidationError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AccountTypeMismatch { .. } => "account_type_mismatch",
            Self::UnknownAccount { .. } => "unknown_account",
            Self::NoOperations => "no_operations",
            Self::TooManyOperations { .. } => "too_many_operations",
            Self::FeeTooLow { .. } => "fee_too_low",
            Self::InvalidSequence => "invalid_sequence",
            Self::InvalidAddress { .. } => "invalid_address",
            Self::InsufficientSignatureWeight { .. } => "insufficient_signature_weight",
            Self::Store(_) => "store_error",
        }
    }
}

fn type_label(code: &i32) -> String {
    match AccountType::from_code(*code) {
        Some(t) => t.to_string(),
        None => format!("unknown({})", code),
    }
}

// ---------------------------------------------------------------------------
// Validator & Chain
// ---------------------------------------------------------------------------

/// One business rule.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn validate(&self, info: &EnvelopeInfo) -> Result<(), ValidationError>;
}

/// Ordered validators; the first failure short-circuits.
#[derive(Clone, Default)]
pub struct ValidatorChain {
    validators: Vec<Arc<dyn Validator>>,
}

impl ValidatorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Structure, signature and account-type checks in that order.
    pub fn standard(
        config: &ValidationConfig,
        core: Arc<dyn CoreStore>,
        accounts: Arc<AccountCache>,
    ) -> Self {
        Self::new()
            .with(StructureValidator::new(config.clone()))
            .with(SignatureValidator::new(core, config.min_signature_weight))
            .with(AccountTypeValidator::new(accounts))
    }

    /// Appends a validator (builder style).
    pub fn with<V: Validator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn push(&mut self, validator: Arc<dyn Validator>) {
        self.validators.push(validator);
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    pub async fn validate(&self, info: &EnvelopeInfo) -> Result<(), ValidationError> {
        for validator in &self.validators {
            if let Err(e) = validator.validate(info).await {
                debug!(
                    hash = %info.hash,
                    validator = validator.name(),
                    error = %e,
                    "envelope rejected"
                );
                return Err(e);
            }
        }
        Ok(())
    }
}
