//! Metrics registry wrapper.
//!
//! Wraps a Prometheus [`Registry`] with the coordination metrics registered
//! and renders it in the text exposition format served at `/metrics`.

use prometheus::{proto::MetricFamily, Encoder, Registry, TextEncoder};

use crate::{
    metrics::register_core_metrics,
    types::{MetricError, MetricResult},
};

/// Content type of the Prometheus text exposition format
pub const TEXT_FORMAT: &str = "text/plain; version=0.0.4";

pub struct MetricsRegistry {
    registry: Registry,
}

impl MetricsRegistry {
    /// Create a new metrics registry with coordination metrics pre-registered
    pub fn new() -> MetricResult<Self> {
        let registry = Registry::new();
        register_core_metrics(&registry)?;
        Ok(Self { registry })
    }

    /// Create a new metrics registry without pre-registered metrics
    pub fn new_empty() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    pub fn inner(&self) -> &Registry {
        &self.registry
    }

    /// Register an additional collector
    pub fn register_collector(
        &self,
        collector: Box<dyn prometheus::core::Collector>,
    ) -> MetricResult<()> {
        self.registry
            .register(collector)
            .map_err(|e| MetricError::RegistrationFailed(e.to_string()))
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Encode metrics in Prometheus text format
    pub fn encode_to_string(&self) -> MetricResult<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.gather();

        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricError::EncodingFailed(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| MetricError::EncodingFailed(e.to_string()))
    }
}

impl std::fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRegistry")
            .field("families", &self.registry.gather().len())
            .finish()
    }
}
