// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Prometheus Metrics
//!
//! Operational metrics for the gateway, scraped at `/metrics` on the
//! metrics port. Everything lives in a dedicated `harbor`-prefixed
//! [`prometheus::Registry`].

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

use harbor_gateway::account::CacheStats;
use harbor_gateway::ResultSource;

#[derive(Clone)]
pub struct NodeMetrics {
    registry: Registry,
    /// Submissions by outcome: `accepted`, or a `GatewayError::kind()`.
    pub submissions_total: IntCounterVec,
    /// Results served, by the store that produced them.
    pub results_total: IntCounterVec,
    pub cache_hits: IntGauge,
    pub cache_misses: IntGauge,
    pub cache_entries: IntGauge,
    /// Wall time of `POST /transactions`, in seconds.
    pub submission_latency_seconds: Histogram,
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("harbor".into()), None)?;

        let submissions_total = IntCounterVec::new(
            Opts::new("submissions_total", "Transaction submissions by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(submissions_total.clone()))?;

        let results_total = IntCounterVec::new(
            Opts::new(
                "results_total",
                "Transaction results served, by resolving store",
            ),
            &["source"],
        )?;
        registry.register(Box::new(results_total.clone()))?;

        let cache_hits = IntGauge::new("account_cache_hits", "Account cache hits since start")?;
        registry.register(Box::new(cache_hits.clone()))?;

        let cache_misses =
            IntGauge::new("account_cache_misses", "Account cache misses since start")?;
        registry.register(Box::new(cache_misses.clone()))?;

        let cache_entries = IntGauge::new("account_cache_entries", "Accounts currently cached")?;
        registry.register(Box::new(cache_entries.clone()))?;

        let submission_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "submission_latency_seconds",
                "End-to-end submission latency in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
            ]),
        )?;
        registry.register(Box::new(submission_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            submissions_total,
            results_total,
            cache_hits,
            cache_misses,
            cache_entries,
            submission_latency_seconds,
        })
    }

    pub fn record_submission(&self, outcome: &str, elapsed: Duration) {
        self.submissions_total.with_label_values(&[outcome]).inc();
        self.submission_latency_seconds
            .observe(elapsed.as_secs_f64());
    }

    pub fn record_result(&self, source: ResultSource) {
        let label = match source {
            ResultSource::None => "absent",
            other => other.as_str(),
        };
        self.results_total.with_label_values(&[label]).inc();
    }

    pub fn observe_cache(&self, stats: CacheStats) {
        self.cache_hits.set(saturating_i64(stats.hits));
        self.cache_misses.set(saturating_i64(stats.misses));
        self.cache_entries.set(saturating_i64(stats.len as u64));
    }

    /// Prometheus text exposition of every registered metric.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

fn saturating_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

pub type SharedMetrics = Arc<NodeMetrics>;

/// `GET /metrics`.
pub async fn metrics_handler(State(metrics): State<SharedMetrics>) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
