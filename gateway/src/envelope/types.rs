//! Wire types for transaction envelopes.
//!
//! These structs are the decoded form of what clients submit. Field order
//! matters: the bincode encoding of [`Transaction`] is the preimage of the
//! content hash, so reordering fields is a hard fork in disguise.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Assets & Memos
// ---------------------------------------------------------------------------

/// An asset moved by a payment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    /// The ledger's native currency.
    Native,
    /// A credit asset issued by an account.
    Credit { code: String, issuer: String },
}

impl Asset {
    pub fn credit(code: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self::Credit {
            code: code.into(),
            issuer: issuer.into(),
        }
    }
}

/// Optional memo attached to a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Memo {
    #[default]
    None,
    Text(String),
    Id(u64),
    Hash([u8; 32]),
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// The action an operation performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationBody {
    /// Create and fund a new account.
    CreateAccount {
        destination: String,
        starting_balance: i64,
    },
    /// Send an amount of one asset to an existing account.
    Payment {
        destination: String,
        asset: Asset,
        amount: i64,
    },
    /// Send one asset, deliver another, converting through `path`.
    PathPayment {
        destination: String,
        send_asset: Asset,
        send_max: i64,
        dest_asset: Asset,
        dest_amount: i64,
        path: Vec<Asset>,
    },
    /// Attach, update, or (with `value: None`) remove a data entry.
    ManageData {
        name: String,
        value: Option<Vec<u8>>,
    },
}

impl OperationBody {
    /// Destination of a payment-shaped operation (one that moves value
    /// into an account that already exists).
    pub fn payment_destination(&self) -> Option<&str> {
        match self {
            Self::Payment { destination, .. } | Self::PathPayment { destination, .. } => {
                Some(destination)
            }
            Self::CreateAccount { .. } | Self::ManageData { .. } => None,
        }
    }

    /// Every account address the operation names, besides its source.
    pub fn referenced_addresses(&self) -> Vec<&str> {
        match self {
            Self::CreateAccount { destination, .. }
            | Self::Payment { destination, .. }
            | Self::PathPayment { destination, .. } => vec![destination.as_str()],
            Self::ManageData { .. } => Vec::new(),
        }
    }

    /// Short name for logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateAccount { .. } => "create_account",
            Self::Payment { .. } => "payment",
            Self::PathPayment { .. } => "path_payment",
            Self::ManageData { .. } => "manage_data",
        }
    }
}

/// A single operation inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Overrides the transaction source for this operation only.
    pub source_account: Option<String>,
    pub body: OperationBody,
}

impl Operation {
    pub fn new(body: OperationBody) -> Self {
        Self {
            source_account: None,
            body,
        }
    }

    /// The account this operation acts on behalf of.
    pub fn effective_source<'a>(&'a self, tx_source: &'a str) -> &'a str {
        self.source_account.as_deref().unwrap_or(tx_source)
    }
}

// ---------------------------------------------------------------------------
// Transaction & Envelope
// ---------------------------------------------------------------------------

/// The signed body of an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Account paying the fee and consuming the sequence number.
    pub source_account: String,
    /// Total fee offered, in stroops.
    pub fee: u64,
    /// Must exceed the source account's current sequence number.
    pub seq_num: u64,
    pub memo: Memo,
    pub operations: Vec<Operation>,
}

/// A signature plus the hint of the key that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoratedSignature {
    /// Last four bytes of the signer's public key.
    pub hint: [u8; 4],
    /// Raw ed25519 signature over the content hash.
    pub signature: Vec<u8>,
}

/// What a client submits: a transaction and the signatures authorizing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    pub tx: Transaction,
    pub signatures: Vec<DecoratedSignature>,
}

/// Validation-facing projection of a decoded envelope.
///
/// Built once per submission attempt and never mutated. `hash` is the
/// key every later lookup uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeInfo {
    /// Lowercase hex content hash under the submission's network.
    pub hash: String,
    /// The same hash as raw bytes; this is what signers sign.
    pub hash_bytes: [u8; 32],
    pub sequence: u64,
    pub source_address: String,
    /// The envelope exactly as submitted (base64).
    pub raw: String,
    pub envelope: TransactionEnvelope,
}

impl EnvelopeInfo {
    pub fn operations(&self) -> &[Operation] {
        &self.envelope.tx.operations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_shaped_operations() {
        let pay = OperationBody::Payment {
            destination: "bob".into(),
            asset: Asset::Native,
            amount: 10,
        };
        let path = OperationBody::PathPayment {
            destination: "carol".into(),
            send_asset: Asset::Native,
            send_max: 10,
            dest_asset: Asset::credit("UAH", "issuer"),
            dest_amount: 5,
            path: vec![],
        };
        let create = OperationBody::CreateAccount {
            destination: "dave".into(),
            starting_balance: 1,
        };
        let data = OperationBody::ManageData {
            name: "k".into(),
            value: None,
        };

        assert_eq!(pay.payment_destination(), Some("bob"));
        assert_eq!(path.payment_destination(), Some("carol"));
        assert_eq!(create.payment_destination(), None);
        assert_eq!(data.payment_destination(), None);
        assert_eq!(create.referenced_addresses(), vec!["dave"]);
        assert!(data.referenced_addresses().is_empty());
    }

    #[test]
    fn operation_source_override() {
        let mut op = Operation::new(OperationBody::ManageData {
            name: "k".into(),
            value: Some(b"v".to_vec()),
        });
        assert_eq!(op.effective_source("alice"), "alice");

        op.source_account = Some("bob".into());
        assert_eq!(op.effective_source("alice"), "bob");
    }
}
