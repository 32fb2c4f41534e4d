//! Envelope construction and signing.
//!
//! The [`EnvelopeBuilder`] assembles an unsigned [`TransactionEnvelope`];
//! [`sign_envelope`] then appends signatures. Keeping the two apart means
//! the hash a client shows to a remote signer is known before any key is
//! involved.

use super::codec::{transaction_hash, EncodeError};
use super::types::{DecoratedSignature, Memo, Operation, OperationBody, Transaction, TransactionEnvelope};
use crate::crypto::keys::Keypair;

// ---------------------------------------------------------------------------
// EnvelopeBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for unsigned envelopes.
///
/// # Usage
///
/// ```
/// use harbor_gateway::envelope::{Asset, EnvelopeBuilder, OperationBody};
///
/// let envelope = EnvelopeBuilder::new("aa".repeat(32))
///     .sequence(1)
///     .fee(100)
///     .operation(OperationBody::Payment {
///         destination: "bb".repeat(32),
///         asset: Asset::Native,
///         amount: 10,
///     })
///     .build();
///
/// assert_eq!(envelope.tx.operations.len(), 1);
/// assert!(envelope.signatures.is_empty());
/// ```
///
/// When no fee is set, `build()` offers `base_fee` per operation.
pub struct EnvelopeBuilder {
    source_account: String,
    fee: Option<u64>,
    base_fee: u64,
    seq_num: u64,
    memo: Memo,
    operations: Vec<Operation>,
}

impl EnvelopeBuilder {
    pub fn new(source_account: impl Into<String>) -> Self {
        Self {
            source_account: source_account.into(),
            fee: None,
            base_fee: crate::config::DEFAULT_BASE_FEE,
            seq_num: 0,
            memo: Memo::None,
            operations: Vec::new(),
        }
    }

    /// Sets the total fee explicitly.
    pub fn fee(mut self, fee: u64) -> Self {
        self.fee = Some(fee);
        self
    }

    /// Sets the per-operation fee used when no explicit fee is given.
    pub fn base_fee(mut self, base_fee: u64) -> Self {
        self.base_fee = base_fee;
        self
    }

    pub fn sequence(mut self, seq_num: u64) -> Self {
        self.seq_num = seq_num;
        self
    }

    pub fn memo(mut self, memo: Memo) -> Self {
        self.memo = memo;
        self
    }

    /// Appends an operation acting for the transaction source.
    pub fn operation(mut self, body: OperationBody) -> Self {
        self.operations.push(Operation::new(body));
        self
    }

    /// Appends an operation acting for another account.
    pub fn operation_from(mut self, source: impl Into<String>, body: OperationBody) -> Self {
        self.operations.push(Operation {
            source_account: Some(source.into()),
            body,
        });
        self
    }

    pub fn build(self) -> TransactionEnvelope {
        let fee = self
            .fee
            .unwrap_or_else(|| self.base_fee.saturating_mul(self.operations.len() as u64));

        TransactionEnvelope {
            tx: Transaction {
                source_account: self.source_account,
                fee,
                seq_num: self.seq_num,
                memo: self.memo,
                operations: self.operations,
            },
            signatures: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

/// Signs the envelope's content hash under `network_passphrase` and
/// appends the decorated signature.
///
/// Signing the same envelope with a different passphrase produces a
/// signature that is useless on any other network.
pub fn sign_envelope<'a>(
    envelope: &'a mut TransactionEnvelope,
    network_passphrase: &str,
    keypair: &Keypair,
) -> Result<&'a TransactionEnvelope, EncodeError> {
    let hash = transaction_hash(&envelope.tx, network_passphrase)?;
    envelope.signatures.push(DecoratedSignature {
        hint: keypair.public_key().hint(),
        signature: keypair.sign(&hash).to_vec(),
    });
    Ok(envelope)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
