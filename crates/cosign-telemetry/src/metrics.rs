//! Coordination metrics.
//!
//! Counters track accepted store operations, the gauge tracks how many
//! proposals are still collecting signatures, and the histogram times each
//! API operation.

use lazy_static::lazy_static;
use prometheus::{
    HistogramOpts, HistogramTimer, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry,
};

use crate::types::MetricResult;

lazy_static! {
    /// Proposals accepted by the store
    pub static ref PROPOSALS_CREATED: IntCounter = IntCounter::new(
        "cosign_proposals_created_total",
        "Total number of proposals created"
    ).expect("Failed to create cosign_proposals_created_total metric");

    /// Signatures appended after creation
    pub static ref SIGNATURES_APPENDED: IntCounter = IntCounter::new(
        "cosign_signatures_appended_total",
        "Total number of signatures appended to open proposals"
    ).expect("Failed to create cosign_signatures_appended_total metric");

    pub static ref PROPOSALS_EXECUTED: IntCounter = IntCounter::new(
        "cosign_proposals_executed_total",
        "Total number of proposals marked executed"
    ).expect("Failed to create cosign_proposals_executed_total metric");

    pub static ref STORE_RESETS: IntCounter = IntCounter::new(
        "cosign_store_resets_total",
        "Total number of administrative store resets"
    ).expect("Failed to create cosign_store_resets_total metric");

    /// Rejected requests by error kind
    pub static ref REQUESTS_REJECTED: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "cosign_requests_rejected_total",
            "Total number of requests rejected, by error kind"
        ),
        &["kind"]
    ).expect("Failed to create cosign_requests_rejected_total metric");

    /// Proposals currently open
    pub static ref OPEN_PROPOSALS: IntGauge = IntGauge::new(
        "cosign_open_proposals",
        "Number of proposals currently collecting signatures"
    ).expect("Failed to create cosign_open_proposals metric");

    /// API operation latency
    pub static ref REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "cosign_request_duration_seconds",
            "Time taken to serve a coordination request in seconds"
        ).buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
        &["operation"]
    ).expect("Failed to create cosign_request_duration_seconds metric");
}

/// Register all coordination metrics with the provided registry
pub fn register_core_metrics(registry: &Registry) -> MetricResult<()> {
    // Counters
    registry.register(Box::new(PROPOSALS_CREATED.clone()))?;
    registry.register(Box::new(SIGNATURES_APPENDED.clone()))?;
    registry.register(Box::new(PROPOSALS_EXECUTED.clone()))?;
    registry.register(Box::new(STORE_RESETS.clone()))?;
    registry.register(Box::new(REQUESTS_REJECTED.clone()))?;

    // Gauges
    registry.register(Box::new(OPEN_PROPOSALS.clone()))?;

    // Histograms
    registry.register(Box::new(REQUEST_DURATION.clone()))?;

    Ok(())
}

/// Count a rejected request under its error kind label
pub fn record_rejection(kind: &str) {
    REQUESTS_REJECTED.with_label_values(&[kind]).inc();
}

/// Start timing an API operation. The duration is observed when the timer
/// is dropped.
pub fn start_request_timer(operation: &str) -> HistogramTimer {
    REQUEST_DURATION
        .with_label_values(&[operation])
        .start_timer()
}

pub fn set_open_proposals(open: usize) {
    OPEN_PROPOSALS.set(i64::try_from(open).unwrap_or(i64::MAX));
}
