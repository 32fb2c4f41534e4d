// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Gateway Configuration & Constants
//!
//! Every magic number the gateway cares about lives here, next to the
//! runtime configuration structs that the node binary fills in from flags
//! and environment variables.
//!
//! The constants describe the wire (envelope size limits, the envelope
//! type tag mixed into the content hash) and the two well-known networks.
//! The structs describe policy: how long a submission may wait, how hard
//! the coordinator polls, how big the account cache is.

use std::time::Duration;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Network Passphrases
// ---------------------------------------------------------------------------

/// Passphrase of the production network. Hashes computed under this
/// passphrase are what the real ledger will recognize.
pub const PUBLIC_NETWORK_PASSPHRASE: &str = "Harbor Public Network ; March 2026";

/// Passphrase of the shared test network. Identical envelope bytes hash
/// differently here, so a testnet transaction can never be replayed on
/// the public network.
pub const TEST_NETWORK_PASSPHRASE: &str = "Harbor Test Network ; March 2026";

// ---------------------------------------------------------------------------
// Wire Constants
// ---------------------------------------------------------------------------

/// Envelope type discriminant mixed into the content hash preimage,
/// big-endian, right after the network id.
pub const ENVELOPE_TYPE_TX: u32 = 2;

/// Upper bound on the decoded envelope size. Anything larger is rejected
/// before bincode gets a chance to allocate for it.
pub const MAX_ENVELOPE_BYTES: u64 = 64 * 1024;

/// Length of an account address: hex-encoded 32-byte ed25519 public key.
pub const ADDRESS_HEX_LENGTH: usize = 64;

/// Number of trailing public key bytes carried in a signature hint.
pub const SIGNATURE_HINT_LENGTH: usize = 4;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// How long `submit` waits for a terminal result before handing the caller
/// a timeout and the hash to poll with later.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of accounts held by the account cache.
pub const DEFAULT_ACCOUNT_CACHE_CAPACITY: usize = 10_000;

/// Maximum operations per transaction. Matches what the ledger enforces,
/// so rejecting early saves a round-trip.
pub const DEFAULT_MAX_OPERATIONS: usize = 100;

/// Minimum fee per operation, in stroops.
pub const DEFAULT_BASE_FEE: u64 = 100;

// ---------------------------------------------------------------------------
// Runtime Configuration
// ---------------------------------------------------------------------------

/// Backoff schedule for polling the result resolver after submission.
///
/// The loop stops at whichever comes first: `max_attempts` polls or the
/// submission deadline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Maximum number of resolver queries per submission.
    pub max_attempts: u32,

    /// Wait before the first re-poll.
    #[serde(with = "millis")]
    pub initial_interval: Duration,

    /// Ceiling on the wait between polls.
    #[serde(with = "millis")]
    pub max_interval: Duration,

    /// Growth factor applied to the interval after each empty poll.
    pub multiplier: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 40,
            initial_interval: Duration::from_millis(250),
            max_interval: Duration::from_secs(2),
            multiplier: 2,
        }
    }
}

impl PollConfig {
    /// Interval to wait after `attempt` empty polls (1-based).
    pub fn interval_for(&self, attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .max(1)
            .saturating_pow(attempt.saturating_sub(1));
        self.initial_interval
            .saturating_mul(factor)
            .min(self.max_interval)
    }
}

/// Account cache sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Number of entries before least-recently-used eviction kicks in.
    pub capacity: usize,

    /// Remember "no such account" answers as well as hits. Off by default:
    /// an account that does not exist yet may be created a ledger later.
    pub cache_negatives: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_ACCOUNT_CACHE_CAPACITY,
            cache_negatives: false,
        }
    }
}

/// Knobs for the built-in validators.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum operations per transaction.
    pub max_operations: usize,

    /// Minimum fee per operation.
    pub base_fee: u64,

    /// Combined signer weight the source account must present.
    pub min_signature_weight: u32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_operations: DEFAULT_MAX_OPERATIONS,
            base_fee: DEFAULT_BASE_FEE,
            min_signature_weight: 1,
        }
    }
}

/// Top-level gateway configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Network whose hash domain submissions are decoded under when the
    /// caller does not name one.
    pub network_passphrase: String,

    /// End-to-end budget for one `submit` call.
    #[serde(with = "millis")]
    pub submit_timeout: Duration,

    pub poll: PollConfig,

    pub cache: CacheConfig,

    pub validation: ValidationConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            network_passphrase: TEST_NETWORK_PASSPHRASE.to_string(),
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
            poll: PollConfig::default(),
            cache: CacheConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Parses a JSON configuration document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Returns a short name for a passphrase, mainly for logging.
pub fn network_name(passphrase: &str) -> &str {
    match passphrase {
        PUBLIC_NETWORK_PASSPHRASE => "public",
        TEST_NETWORK_PASSPHRASE => "testnet",
        _ => "custom",
    }
}

/// Durations in config files are plain millisecond integers.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passphrases_are_distinct() {
        assert_ne!(PUBLIC_NETWORK_PASSPHRASE, TEST_NETWORK_PASSPHRASE);
    }

    #[test]
    fn network_names() {
        assert_eq!(network_name(PUBLIC_NETWORK_PASSPHRASE), "public");
        assert_eq!(network_name(TEST_NETWORK_PASSPHRASE), "testnet");
        assert_eq!(network_name("Standalone Network"), "custom");
    }

    #[test]
    fn poll_interval_grows_then_caps() {
        let poll = PollConfig {
            max_attempts: 10,
            initial_interval: Duration::from_millis(100),
            max_interval: Duration::from_millis(500),
            multiplier: 2,
        };

        assert_eq!(poll.interval_for(1), Duration::from_millis(100));
        assert_eq!(poll.interval_for(2), Duration::from_millis(200));
        assert_eq!(poll.interval_for(3), Duration::from_millis(400));
        assert_eq!(poll.interval_for(4), Duration::from_millis(500));
        assert_eq!(poll.interval_for(30), Duration::from_millis(500));
    }

    #[test]
    fn multiplier_of_zero_behaves_like_constant_interval() {
        let poll = PollConfig {
            multiplier: 0,
            ..Default::default()
        };
        assert_eq!(poll.interval_for(5), poll.initial_interval);
    }

    #[test]
    fn json_config_fills_missing_fields_with_defaults() {
        let cfg = GatewayConfig::from_json(
            r#"{ "submit_timeout": 5000, "cache": { "capacity": 16 } }"#,
        )
        .unwrap();

        assert_eq!(cfg.submit_timeout, Duration::from_secs(5));
        assert_eq!(cfg.cache.capacity, 16);
        assert!(!cfg.cache.cache_negatives);
        assert_eq!(cfg.network_passphrase, TEST_NETWORK_PASSPHRASE);
        assert_eq!(cfg.poll, PollConfig::default());
    }

    #[test]
    fn default_timing_sanity() {
        let poll = PollConfig::default();
        assert!(poll.initial_interval <= poll.max_interval);
        assert!(poll.max_interval < DEFAULT_SUBMIT_TIMEOUT);
    }
}
