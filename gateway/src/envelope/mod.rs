//! # Transaction Envelopes
//!
//! Everything between "a client sent us some base64" and "we have a typed
//! transaction with a content hash":
//!
//! - [`types`]: the envelope data model.
//! - [`codec`]: transport decoding, encoding and the network-bound hash.
//! - [`builder`]: construction and signing, for clients and tests.

pub mod builder;
pub mod codec;
pub mod types;

pub use builder::{sign_envelope, EnvelopeBuilder};
pub use codec::{
    decode, encode, transaction_hash, transaction_hash_hex, EncodeError,
    MalformedTransactionError,
};
pub use types::{
    Asset, DecoratedSignature, EnvelopeInfo, Memo, Operation, OperationBody, Transaction,
    TransactionEnvelope,
};
