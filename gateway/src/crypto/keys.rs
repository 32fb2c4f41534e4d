// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Key Management
//!
//! Ed25519 keypairs for account holders. An account address *is* its
//! master public key, hex-encoded, so there is no separate address
//! derivation step to get wrong.
//!
//! The gateway itself never holds secret keys in production; keypairs exist
//! here for clients, the dev ledger, and tests that need to produce signed
//! envelopes.

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;
use thiserror::Error;

use crate::config::ADDRESS_HEX_LENGTH;

/// Errors that can occur during key operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid secret key bytes")]
    InvalidSecretKey,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
}

/// An ed25519 keypair.
///
/// Deliberately not `Serialize`. Exporting secret material goes through
/// [`Keypair::secret_key_hex`] and nowhere else.
pub struct Keypair {
    signing_key: SigningKey,
}

/// The public half of a keypair, doubling as the account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    bytes: [u8; 32],
}

impl Keypair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Construct a keypair deterministically from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Reconstruct a keypair from a hex-encoded secret key.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str).map_err(|_| KeyError::InvalidSecretKey)?;
        let seed: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self::from_seed(&seed))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// The account address controlled by this keypair.
    pub fn address(&self) -> String {
        self.public_key().to_address()
    }

    /// Sign a message, returning the 64 raw signature bytes.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Export the secret key as hex. Handle with care.
    pub fn secret_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }
}

impl Clone for Keypair {
    fn clone(&self) -> Self {
        Self::from_seed(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material.
        write!(f, "Keypair(pub={})", self.public_key())
    }
}

impl PublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Parse an account address (lowercase hex public key).
    pub fn from_address(address: &str) -> Result<Self, KeyError> {
        if address.len() != ADDRESS_HEX_LENGTH {
            return Err(KeyError::InvalidPublicKey(format!(
                "expected {} hex chars, got {}",
                ADDRESS_HEX_LENGTH,
                address.len()
            )));
        }
        if address.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(KeyError::InvalidPublicKey(
                "address must be lowercase hex".to_string(),
            ));
        }
        let bytes = hex::decode(address).map_err(|e| KeyError::InvalidPublicKey(e.to_string()))?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self { bytes: arr })
    }

    pub fn to_address(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Trailing bytes of the key, used as a signature hint so verifiers
    /// can skip signers that obviously did not produce a signature.
    pub fn hint(&self) -> [u8; 4] {
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&self.bytes[28..]);
        hint
    }

    /// Verify an ed25519 signature. Malformed keys or signatures simply
    /// fail verification.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let Ok(sig) = DalekSignature::from_slice(signature) else {
            return false;
        };
        key.verify(message, &sig).is_ok()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_address())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_address())
    }
}

/// Returns `true` if `address` parses as an account address.
pub fn is_valid_address(address: &str) -> bool {
    PublicKey::from_address(address).is_ok()
}
