// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus metrics adapter for Chatlytics.
//!
//! Uses the metrics-rs facade with the Prometheus exporter. Metrics are
//! rendered in Prometheus text format via [`PrometheusAdapter::render`],
//! which the gateway exposes on `/metrics`.

pub mod recording;

use async_trait::async_trait;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use chatlytics_core::{AdapterType, ChatlyticsError, HealthStatus, PluginAdapter};

pub use recording::{record_computation, record_ingested, record_recompute_job, register_metrics};

/// Prometheus metrics adapter.
///
/// Installs the Prometheus recorder and exposes a handle for rendering.
pub struct PrometheusAdapter {
    handle: PrometheusHandle,
}

impl PrometheusAdapter {
    /// Install the Prometheus recorder globally.
    ///
    /// Only one recorder can be installed per process; a second call fails.
    pub fn new() -> Result<Self, ChatlyticsError> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            ChatlyticsError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;

        recording::register_metrics();

        tracing::info!("prometheus metrics recorder installed");

        Ok(Self { handle })
    }

    /// A handle that renders without the adapter, e.g. from a gateway closure.
    pub fn handle(&self) -> &PrometheusHandle {
        &self.handle
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }
}

#[async_trait]
impl PluginAdapter for PrometheusAdapter {
    fn name(&self) -> &str {
        "prometheus"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Observability
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatlyticsError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ChatlyticsError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global recorder can only be installed once per process, so the
    // whole adapter lifecycle lives in a single test.
    #[tokio::test]
    async fn adapter_renders_recorded_metrics() {
        let adapter = PrometheusAdapter::new().unwrap();
        assert!(PrometheusAdapter::new().is_err());

        record_computation("count", "success", 0.02);
        record_ingested("request");
        record_recompute_job("skipped");

        let text = adapter.render();
        assert!(text.contains("chatlytics_computations_total"));
        assert!(text.contains("kind=\"count\""));
        assert!(text.contains("chatlytics_messages_ingested_total"));
        assert!(text.contains("chatlytics_recompute_jobs_total"));

        assert_eq!(adapter.name(), "prometheus");
        assert_eq!(adapter.adapter_type(), AdapterType::Observability);
        assert_eq!(adapter.health_check().await.unwrap(), HealthStatus::Healthy);
    }
}
