// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Harbor Node
//!
//! Entry point for the `harbor-node` binary. Parses CLI arguments, sets up
//! logging and metrics, wires the gateway over its stores, and serves the
//! REST API.
//!
//! - `run`     — serve the gateway in front of an in-process dev ledger
//! - `hash`    — print an envelope's content hash
//! - `version` — print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;

use harbor_gateway::config::network_name;
use harbor_gateway::network::{DevLedger, DevLedgerConfig};
use harbor_gateway::store::{
    HistoryIngest, HistoryStore, MemoryCoreStore, MemoryHistoryStore, SledHistoryStore,
};
use harbor_gateway::SubmissionCoordinator;

use cli::{Commands, HarborNodeCli};
use metrics::NodeMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = HarborNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Hash(args) => print_hash(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// History backend chosen at startup.
fn open_history(
    args: &cli::RunArgs,
) -> Result<(Arc<dyn HistoryStore>, Arc<dyn HistoryIngest>)> {
    match &args.history_path {
        Some(path) => {
            std::fs::create_dir_all(path)
                .with_context(|| format!("failed to create history directory {}", path.display()))?;
            let store = Arc::new(
                SledHistoryStore::open(path)
                    .with_context(|| format!("failed to open history store at {}", path.display()))?,
            );
            tracing::info!(path = %path.display(), "sled history store opened");
            let history: Arc<dyn HistoryStore> = store.clone();
            let ingest: Arc<dyn HistoryIngest> = store;
            Ok((history, ingest))
        }
        None => {
            tracing::warn!("no --history-path, history is in memory and lost on exit");
            let store = Arc::new(MemoryHistoryStore::new());
            let history: Arc<dyn HistoryStore> = store.clone();
            let ingest: Arc<dyn HistoryIngest> = store;
            Ok((history, ingest))
        }
    }
}

async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(logging::DEFAULT_DIRECTIVES, args.log_format)
        .context("failed to initialize logging")?;

    let config = args.gateway_config()?;
    let network = network_name(&config.network_passphrase).to_string();
    tracing::info!(
        api_port = args.api_port,
        metrics_port = args.metrics_port,
        network = %network,
        submit_timeout_ms = config.submit_timeout.as_millis() as u64,
        cache_capacity = config.cache.capacity,
        "starting harbor-node"
    );

    // --- Stores & ledger ---
    let core = Arc::new(MemoryCoreStore::new());
    let (history, ingest) = open_history(&args)?;
    let ledger = Arc::new(DevLedger::new(
        DevLedgerConfig {
            network_passphrase: config.network_passphrase.clone(),
            close_delay: Duration::ZERO,
            ingestion_lag: Some(Duration::from_millis(args.ingestion_lag_ms)),
        },
        core.clone(),
        ingest,
    ));
    for (address, account_type) in args.genesis_accounts()? {
        ledger
            .register_account(&address, account_type)
            .await
            .with_context(|| format!("failed to register dev account {}", address))?;
    }

    // --- Gateway ---
    let gateway = Arc::new(SubmissionCoordinator::assemble(
        config, core, history, ledger,
    ));
    tracing::info!(validators = ?gateway.validators().names(), "gateway assembled");

    // --- Metrics ---
    let node_metrics = Arc::new(NodeMetrics::new().context("failed to register metrics")?);

    // --- API server ---
    let app_state = api::AppState {
        version: env!("CARGO_PKG_VERSION").to_string(),
        network,
        gateway,
        metrics: Arc::clone(&node_metrics),
    };
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", args.api_port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!(error = %e, "API server error");
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!(error = %e, "metrics server error");
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
    }

    tracing::info!("harbor-node stopped");
    Ok(())
}

fn print_hash(args: cli::HashArgs) -> Result<()> {
    let envelope = match args.envelope {
        Some(envelope) => envelope,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read envelope from stdin")?;
            buf
        }
    };

    let info = harbor_gateway::envelope::decode(&envelope, &args.network_passphrase)?;
    println!("{}", info.hash);
    Ok(())
}

fn print_version() {
    println!("harbor-node {}", env!("CARGO_PKG_VERSION"));
    println!("rustc       {}", option_env!("RUSTC_VERSION").unwrap_or("unknown"));
}

/// Waits for SIGINT or SIGTERM, whichever comes first. Ctrl+C only off Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
