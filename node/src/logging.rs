// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Structured Logging
//!
//! Installs the global `tracing` subscriber: pretty or JSON lines, filtered
//! by `RUST_LOG` when set and by [`DEFAULT_DIRECTIVES`] otherwise.
//!
//! Everything goes to stderr. Stdout belongs to commands like `hash`.

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVES: &str = "harbor_node=info,harbor_gateway=info,tower_http=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable, colored output for local development.
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

fn env_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// Installs the subscriber. Fails if one is already installed.
pub fn init_logging(
    default_directives: &str,
    format: LogFormat,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = env_filter(default_directives);

    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()?,
    }

    tracing::debug!(?format, "logging initialized");
    Ok(())
}
