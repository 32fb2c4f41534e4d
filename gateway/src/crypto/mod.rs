// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Cryptographic Primitives
//!
//! Thin, type-safe wrappers around audited implementations:
//!
//! - **SHA-256** for content hashes and network ids.
//! - **Ed25519** for envelope signatures.
//!
//! We don't roll our own. If you feel the urge, go read about timing
//! attacks first.

pub mod hash;
pub mod keys;

pub use hash::{is_hash_hex, network_id, sha256, sha256_array, sha256_multi};
pub use keys::{is_valid_address, KeyError, Keypair, PublicKey};
