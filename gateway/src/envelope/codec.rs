//! Envelope transport encoding and content hashing.
//!
//! On the wire an envelope is `base64(bincode(TransactionEnvelope))` with
//! fixed-width little-endian integers. Decoding is strict: no trailing
//! bytes, no inputs above [`MAX_ENVELOPE_BYTES`].
//!
//! The content hash is
//!
//! ```text
//! sha256( sha256(passphrase) || ENVELOPE_TYPE_TX as u32 BE || bincode(tx) )
//! ```
//!
//! Signatures are excluded from the preimage, so adding a signature never
//! changes the hash a client already handed out.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bincode::Options;
use thiserror::Error;

use super::types::{EnvelopeInfo, Transaction, TransactionEnvelope};
use crate::config::{ENVELOPE_TYPE_TX, MAX_ENVELOPE_BYTES};
use crate::crypto::hash::{network_id, sha256_multi};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The submitted text is not a decodable envelope, or its hash could not
/// be derived. Never retryable: the caller must fix the input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed transaction envelope: {reason}")]
pub struct MalformedTransactionError {
    /// The input exactly as received.
    pub raw: String,
    /// What went wrong, for humans.
    pub reason: String,
}

impl MalformedTransactionError {
    fn new(raw: &str, reason: impl Into<String>) -> Self {
        Self {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

/// Serializing an envelope failed (in practice: it is over the size limit).
#[derive(Debug, Error)]
#[error("envelope encoding failed: {0}")]
pub struct EncodeError(#[from] bincode::Error);

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(MAX_ENVELOPE_BYTES)
        .reject_trailing_bytes()
}

/// Decodes a base64 envelope and derives its content hash for the network
/// named by `network_passphrase`.
///
/// Surrounding whitespace is ignored; anything else that is not a
/// canonical envelope is a [`MalformedTransactionError`].
///
/// # Example
///
/// ```
/// use harbor_gateway::config::TEST_NETWORK_PASSPHRASE;
/// use harbor_gateway::envelope::decode;
///
/// let err = decode("not base64!", TEST_NETWORK_PASSPHRASE).unwrap_err();
/// assert_eq!(err.raw, "not base64!");
/// ```
pub fn decode(
    raw: &str,
    network_passphrase: &str,
) -> Result<EnvelopeInfo, MalformedTransactionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MalformedTransactionError::new(raw, "empty envelope"));
    }

    let bytes = STANDARD
        .decode(trimmed)
        .map_err(|e| MalformedTransactionError::new(raw, format!("invalid base64: {}", e)))?;

    let envelope: TransactionEnvelope = wire_options()
        .deserialize(&bytes)
        .map_err(|e| MalformedTransactionError::new(raw, format!("invalid envelope: {}", e)))?;

    let hash_bytes = transaction_hash(&envelope.tx, network_passphrase)
        .map_err(|e| MalformedTransactionError::new(raw, format!("cannot hash: {}", e)))?;

    Ok(EnvelopeInfo {
        hash: hex::encode(hash_bytes),
        hash_bytes,
        sequence: envelope.tx.seq_num,
        source_address: envelope.tx.source_account.clone(),
        raw: trimmed.to_string(),
        envelope,
    })
}

/// Encodes an envelope for transport.
pub fn encode(envelope: &TransactionEnvelope) -> Result<String, EncodeError> {
    let bytes = wire_options().serialize(envelope)?;
    Ok(STANDARD.encode(bytes))
}

/// Computes the content hash of a transaction body on a given network.
pub fn transaction_hash(tx: &Transaction, network_passphrase: &str) -> Result<[u8; 32], EncodeError> {
    let body = wire_options().serialize(tx)?;
    let network = network_id(network_passphrase);
    Ok(sha256_multi(&[
        &network,
        &ENVELOPE_TYPE_TX.to_be_bytes(),
        &body,
    ]))
}

/// Hex form of [`transaction_hash`].
pub fn transaction_hash_hex(
    tx: &Transaction,
    network_passphrase: &str,
) -> Result<String, EncodeError> {
    transaction_hash(tx, network_passphrase).map(hex::encode)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
