// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # CLI Interface
//!
//! Command-line arguments for `harbor-node`, via `clap` derive. Three
//! subcommands: `run`, `hash`, and `version`.
//!
//! Every `run` knob has a `HARBOR_*` environment fallback. When `--config`
//! names a JSON file, it is loaded first and explicit flags win over it.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use harbor_gateway::account::AccountType;
use harbor_gateway::config::TEST_NETWORK_PASSPHRASE;
use harbor_gateway::GatewayConfig;

use crate::logging::LogFormat;

/// Harbor transaction gateway.
///
/// Validates signed transaction envelopes, forwards the admissible ones to
/// the ledger, and reports their results from the core and history stores.
#[derive(Parser, Debug)]
#[command(
    name = "harbor-node",
    about = "Harbor transaction gateway node",
    version,
    propagate_version = true
)]
pub struct HarborNodeCli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the gateway API in front of an in-process dev ledger.
    Run(RunArgs),
    /// Print the content hash of an envelope.
    Hash(HashArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// JSON gateway configuration. Flags below override its values.
    #[arg(long, short = 'c', env = "HARBOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port for the REST API.
    #[arg(long, env = "HARBOR_API_PORT", default_value_t = 8000)]
    pub api_port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "HARBOR_METRICS_PORT", default_value_t = 9100)]
    pub metrics_port: u16,

    /// Network passphrase submissions are hashed under.
    #[arg(long, env = "HARBOR_NETWORK_PASSPHRASE")]
    pub network_passphrase: Option<String>,

    /// End-to-end budget for one submission, in milliseconds.
    #[arg(long, env = "HARBOR_SUBMIT_TIMEOUT_MS")]
    pub submit_timeout_ms: Option<u64>,

    /// Maximum resolver polls per submission.
    #[arg(long, env = "HARBOR_POLL_MAX_ATTEMPTS")]
    pub poll_max_attempts: Option<u32>,

    /// First wait between polls, in milliseconds.
    #[arg(long, env = "HARBOR_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// Account cache capacity. Zero disables caching.
    #[arg(long, env = "HARBOR_CACHE_CAPACITY")]
    pub cache_capacity: Option<usize>,

    /// Also cache "no such account" answers.
    #[arg(long, env = "HARBOR_CACHE_NEGATIVES")]
    pub cache_negatives: bool,

    /// Directory for the sled history store. In-memory when omitted.
    #[arg(long, env = "HARBOR_HISTORY_PATH")]
    pub history_path: Option<PathBuf>,

    /// Delay between a ledger close and history ingestion, in milliseconds.
    #[arg(long, env = "HARBOR_INGESTION_LAG_MS", default_value_t = 1000)]
    pub ingestion_lag_ms: u64,

    /// Genesis accounts for the dev ledger, as `address:type`
    /// (e.g. `ab12...:merchant`). Repeatable or comma separated.
    #[arg(long = "dev-account", env = "HARBOR_DEV_ACCOUNTS", value_delimiter = ',')]
    pub dev_accounts: Vec<String>,

    /// Log output format.
    #[arg(long, env = "HARBOR_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl RunArgs {
    /// Builds the effective gateway configuration: defaults, then the
    /// config file, then flags.
    pub fn gateway_config(&self) -> Result<GatewayConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                GatewayConfig::from_json(&json)
                    .with_context(|| format!("invalid config file {}", path.display()))?
            }
            None => GatewayConfig::default(),
        };

        if let Some(passphrase) = &self.network_passphrase {
            config.network_passphrase = passphrase.clone();
        }
        if let Some(ms) = self.submit_timeout_ms {
            config.submit_timeout = Duration::from_millis(ms);
        }
        if let Some(attempts) = self.poll_max_attempts {
            config.poll.max_attempts = attempts;
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll.initial_interval = Duration::from_millis(ms);
        }
        if let Some(capacity) = self.cache_capacity {
            config.cache.capacity = capacity;
        }
        if self.cache_negatives {
            config.cache.cache_negatives = true;
        }
        Ok(config)
    }

    /// Parses `--dev-account` entries.
    pub fn genesis_accounts(&self) -> Result<Vec<(String, AccountType)>> {
        self.dev_accounts
            .iter()
            .map(|entry| parse_dev_account(entry))
            .collect()
    }
}

fn parse_dev_account(entry: &str) -> Result<(String, AccountType)> {
    let Some((address, kind)) = entry.trim().split_once(':') else {
        bail!("dev account {:?} is not address:type", entry);
    };
    if !harbor_gateway::crypto::is_valid_address(address) {
        bail!("dev account {:?} has an invalid address", entry);
    }
    let Some(account_type) = AccountType::ALL
        .into_iter()
        .find(|t| t.as_str().eq_ignore_ascii_case(kind))
    else {
        bail!("dev account {:?} has unknown type {:?}", entry, kind);
    };
    Ok((address.to_string(), account_type))
}

/// Arguments for the `hash` subcommand.
#[derive(Parser, Debug)]
pub struct HashArgs {
    /// Base64 envelope. Reads stdin when omitted.
    pub envelope: Option<String>,

    /// Network passphrase to hash under.
    #[arg(long, env = "HARBOR_NETWORK_PASSPHRASE", default_value = TEST_NETWORK_PASSPHRASE)]
    pub network_passphrase: String,
}
