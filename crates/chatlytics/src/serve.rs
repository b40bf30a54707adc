// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `chatlytics serve` command implementation.
//!
//! Opens storage, builds the HTTP collaborators, then runs the REST gateway
//! and the recompute scheduler until SIGINT/SIGTERM.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use chatlytics_analytics::{AnalyticService, MessageIngestor, RecomputeScheduler};
use chatlytics_config::ChatlyticsConfig;
use chatlytics_core::{ChatlyticsError, PluginAdapter};
use chatlytics_gateway::{AuthConfig, GatewayState, HealthState, ServerConfig};
use chatlytics_storage::SqliteStore;

use crate::adapters::{self, Collaborators};
use crate::shutdown;

/// Runs the `chatlytics serve` command.
pub async fn run_serve(config: ChatlyticsConfig) -> Result<(), ChatlyticsError> {
    info!(service = %config.service.name, "starting chatlytics");

    let store = Arc::new(
        SqliteStore::open(&config.storage.database_path, config.storage.wal_mode).await?,
    );

    let collaborators = Collaborators::from_config(&config)?;
    collaborators.log_health().await;

    let service = AnalyticService::new(store.clone(), collaborators.engine(&config));
    let ingestor = MessageIngestor::new(
        collaborators.search.clone(),
        config.search.messages_index.clone(),
    );

    // Initialize Prometheus metrics (if compiled in).
    #[cfg(feature = "prometheus")]
    let prometheus_adapter = match chatlytics_prometheus::PrometheusAdapter::new() {
        Ok(adapter) => {
            info!("prometheus metrics enabled");
            Some(adapter)
        }
        Err(e) => {
            warn!(error = %e, "prometheus initialization failed, continuing without metrics");
            None
        }
    };

    #[cfg(feature = "prometheus")]
    let prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>> =
        prometheus_adapter.as_ref().map(|adapter| {
            let handle = adapter.handle().clone();
            Arc::new(move || handle.render()) as Arc<dyn Fn() -> String + Send + Sync>
        });
    #[cfg(not(feature = "prometheus"))]
    let prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>> = None;

    let cancel = shutdown::install_signal_handler();

    let scheduler = if config.scheduler.enabled {
        let scheduler =
            RecomputeScheduler::new(service.clone(), adapters::scheduler_settings(&config));
        Some(tokio::spawn(scheduler.run(cancel.clone())))
    } else {
        debug!("recompute scheduler disabled by configuration");
        None
    };

    if config.gateway.bearer_token.is_none() {
        warn!("gateway.bearer_token is not set; every /v1 request will be rejected");
    }
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
        bearer_token: config.gateway.bearer_token.clone(),
    };
    let state = GatewayState {
        service,
        ingestor,
        auth: AuthConfig {
            bearer_token: server_config.bearer_token.clone(),
        },
        health: HealthState {
            start_time: std::time::Instant::now(),
            prometheus_render,
        },
    };

    let served = chatlytics_gateway::start_server(&server_config, state, cancel.clone()).await;
    if let Err(e) = &served {
        error!(error = %e, "gateway stopped with an error");
    }

    // The gateway may have exited on its own; stop everything else too.
    cancel.cancel();
    if let Some(handle) = scheduler {
        if let Err(e) = handle.await {
            warn!(error = %e, "scheduler task ended abnormally");
        }
    }

    if let Err(e) = store.shutdown().await {
        warn!(error = %e, "storage shutdown failed");
    }
    info!("chatlytics stopped");
    served
}
