// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Construction of the collaborator adapters from configuration.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use chatlytics_analytics::{ComputeEngine, EngineSettings, SchedulerSettings};
use chatlytics_config::ChatlyticsConfig;
use chatlytics_core::{ChatlyticsError, HealthStatus, PluginAdapter};
use chatlytics_search::{ElasticsearchExecutor, HttpTaskManager};

/// The HTTP collaborators every command talks to.
pub struct Collaborators {
    pub search: Arc<ElasticsearchExecutor>,
    pub tasks: Arc<HttpTaskManager>,
}

impl Collaborators {
    pub fn from_config(config: &ChatlyticsConfig) -> Result<Self, ChatlyticsError> {
        Ok(Self {
            search: Arc::new(ElasticsearchExecutor::new(&config.search)?),
            tasks: Arc::new(HttpTaskManager::new(&config.task_manager)?),
        })
    }

    pub fn engine(&self, config: &ChatlyticsConfig) -> ComputeEngine {
        ComputeEngine::new(
            self.search.clone(),
            self.tasks.clone(),
            engine_settings(config),
        )
    }

    /// Logs each collaborator's health. Unhealthy collaborators are not fatal.
    pub async fn log_health(&self) {
        let adapters: [&dyn PluginAdapter; 2] = [self.search.as_ref(), self.tasks.as_ref()];
        for adapter in adapters {
            match adapter.health_check().await {
                Ok(HealthStatus::Healthy) => info!(adapter = adapter.name(), "adapter healthy"),
                Ok(HealthStatus::Degraded(reason)) => {
                    warn!(adapter = adapter.name(), %reason, "adapter degraded")
                }
                Ok(HealthStatus::Unhealthy(reason)) => {
                    warn!(adapter = adapter.name(), %reason, "adapter unhealthy")
                }
                Err(e) => warn!(adapter = adapter.name(), error = %e, "health check failed"),
            }
        }
    }
}

pub fn engine_settings(config: &ChatlyticsConfig) -> EngineSettings {
    EngineSettings {
        messages_index: config.search.messages_index.clone(),
        engaged_min_requests: config.analytics.engaged_min_requests,
        fallback_intent: config.analytics.fallback_intent.clone(),
        terms_size: config.analytics.terms_size,
    }
}

pub fn scheduler_settings(config: &ChatlyticsConfig) -> SchedulerSettings {
    SchedulerSettings {
        interval: Duration::from_secs(config.scheduler.interval_secs),
        workers: config.scheduler.workers,
        ..SchedulerSettings::default()
    }
}
