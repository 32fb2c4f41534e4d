//! Signature weight check against the signer sets in the core store.
//!
//! Every account the transaction acts for (its source plus any operation
//! source overrides) must present signatures from distinct signers whose
//! weights add up to the threshold. A signature counts for a signer when
//! its hint matches the signer key and it verifies over the content hash.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use async_trait::async_trait;

use super::{ValidationError, Validator};
use crate::crypto::PublicKey;
use crate::envelope::{DecoratedSignature, EnvelopeInfo};
use crate::store::{CoreStore, Signer};

pub struct SignatureValidator {
    core: Arc<dyn CoreStore>,
    min_weight: u32,
}

impl SignatureValidator {
    pub fn new(core: Arc<dyn CoreStore>, min_weight: u32) -> Self {
        Self { core, min_weight }
    }
}

/// Sum of weights of distinct signers with a valid signature.
fn signed_weight(signers: &[Signer], signatures: &[DecoratedSignature], hash: &[u8; 32]) -> u32 {
    let mut counted = HashSet::new();
    let mut weight = 0u32;

    for signer in signers {
        if counted.contains(signer.key.as_str()) {
            continue;
        }
        let Ok(key) = PublicKey::from_address(&signer.key) else {
            continue;
        };
        let hint = key.hint();
        let signed = signatures
            .iter()
            .filter(|s| s.hint == hint)
            .any(|s| key.verify(hash, &s.signature));
        if signed {
            counted.insert(signer.key.as_str());
            weight = weight.saturating_add(signer.weight);
        }
    }
    weight
}

#[async_trait]
impl Validator for SignatureValidator {
    fn name(&self) -> &'static str {
        "signature"
    }

    async fn validate(&self, info: &EnvelopeInfo) -> Result<(), ValidationError> {
        let tx = &info.envelope.tx;
        let accounts: BTreeSet<&str> = std::iter::once(tx.source_account.as_str())
            .chain(tx.operations.iter().filter_map(|op| op.source_account.as_deref()))
            .collect();

        for address in accounts {
            let signers = self.core.find_signers_by_address(address).await?;
            if signers.is_empty() {
                return Err(ValidationError::UnknownAccount {
                    address: address.to_string(),
                });
            }

            let weight = signed_weight(&signers, &info.envelope.signatures, &info.hash_bytes);
            if weight < self.min_weight {
                return Err(ValidationError::InsufficientSignatureWeight {
                    address: address.to_string(),
                    weight,
                    required: self.min_weight,
                });
            }
        }
        Ok(())
    }
}
