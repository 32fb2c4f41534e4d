// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Hashing Utilities
//!
//! SHA-256 is the only hash the gateway speaks, because it is the one the
//! ledger speaks. Content hashes, network ids, and signature payloads are
//! all SHA-256 digests; there is no room for a second opinion when the
//! hash is the primary key for result lookup.
//!
//! ## Network id
//!
//! A network is named by its passphrase, and identified on the wire by
//! `sha256(passphrase)`. Mixing the network id into every transaction hash
//! is what makes a testnet envelope worthless on the public network.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data as a `Vec<u8>`.
///
/// # Example
///
/// ```
/// use harbor_gateway::crypto::sha256;
///
/// let hash = sha256(b"harbor");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    sha256_array(data).to_vec()
}

/// Compute the SHA-256 hash and return a fixed-size array.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    sha256_multi(&[data])
}

/// Hash several byte slices as if they were concatenated, without
/// building the concatenation.
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Derive the 32-byte network id from a network passphrase.
///
/// # Example
///
/// ```
/// use harbor_gateway::config::{PUBLIC_NETWORK_PASSPHRASE, TEST_NETWORK_PASSPHRASE};
/// use harbor_gateway::crypto::network_id;
///
/// assert_ne!(
///     network_id(PUBLIC_NETWORK_PASSPHRASE),
///     network_id(TEST_NETWORK_PASSPHRASE),
/// );
/// ```
pub fn network_id(passphrase: &str) -> [u8; 32] {
    sha256_array(passphrase.as_bytes())
}

/// Returns `true` if `s` looks like a lowercase hex SHA-256 digest.
pub fn is_hash_hex(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        // SHA-256 of the empty string.
        let hash = sha256(b"");
        let expected =
            hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
                .unwrap();
        assert_eq!(hash, expected);
    }

    #[test]
    fn sha256_array_matches_vec() {
        let vec_result = sha256(b"test data");
        let arr_result = sha256_array(b"test data");
        assert_eq!(vec_result.as_slice(), arr_result.as_slice());
    }

    #[test]
    fn multi_part_hash_equals_concatenation() {
        let joined = sha256_array(b"network-idpayload");
        let parts = sha256_multi(&[b"network-id", b"payload"]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn network_id_is_passphrase_digest() {
        assert_eq!(network_id("abc"), sha256_array(b"abc"));
    }

    #[test]
    fn hash_hex_detection() {
        assert!(is_hash_hex(&hex::encode(sha256_array(b"x"))));
        assert!(!is_hash_hex("deadbeef"));
        assert!(!is_hash_hex(&hex::encode(sha256_array(b"x")).to_uppercase()));
        assert!(!is_hash_hex(&"g".repeat(64)));
    }
}
