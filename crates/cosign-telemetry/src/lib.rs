//! Telemetry for the cosign coordination service.
//!
//! Prometheus counters, gauges and histograms describing proposal traffic,
//! plus a registry that renders them for scraping.

pub mod metrics;
pub mod registry;
pub mod types;

pub use metrics::{
    record_rejection, set_open_proposals, start_request_timer, OPEN_PROPOSALS,
    PROPOSALS_CREATED, PROPOSALS_EXECUTED, REQUESTS_REJECTED, REQUEST_DURATION,
    SIGNATURES_APPENDED, STORE_RESETS,
};
pub use registry::{MetricsRegistry, TEXT_FORMAT};
pub use types::{MetricError, MetricResult};

use lazy_static::lazy_static;
use std::sync::Arc;

lazy_static! {
    /// Global metrics registry instance
    pub static ref METRICS_REGISTRY: Arc<MetricsRegistry> = Arc::new(
        MetricsRegistry::new()
            .expect("Failed to initialize metrics registry")
    );
}

/// Initialize the telemetry subsystem
pub fn init() -> MetricResult<()> {
    let _ = &*METRICS_REGISTRY;

    cosign_log::info!("Telemetry subsystem initialized");
    Ok(())
}

/// Shared handle to the global metrics registry
pub fn registry() -> Arc<MetricsRegistry> {
    METRICS_REGISTRY.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert!(init().is_ok());
    }

    #[test]
    fn test_registry_is_shared() {
        let a = registry();
        let b = registry();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
