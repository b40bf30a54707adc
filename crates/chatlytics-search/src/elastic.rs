// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Elasticsearch-compatible search executor.
//!
//! Speaks the `_search`, `_doc` and `_cluster/health` endpoints over HTTP
//! with optional basic auth. Failures are returned unchanged to the caller;
//! nothing is retried here.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use chatlytics_config::model::SearchConfig;
use chatlytics_core::{AdapterType, ChatlyticsError, HealthStatus, PluginAdapter, SearchExecutor};

use crate::http;

#[derive(Debug, Clone)]
struct Credentials {
    username: String,
    password: Option<String>,
}

/// HTTP search executor.
#[derive(Debug, Clone)]
pub struct ElasticsearchExecutor {
    client: reqwest::Client,
    base_url: Url,
    credentials: Option<Credentials>,
}

#[derive(Debug, Deserialize)]
struct ClusterHealth {
    status: String,
}

impl ElasticsearchExecutor {
    pub fn new(config: &SearchConfig) -> Result<Self, ChatlyticsError> {
        Ok(Self {
            client: http::build_client(config.timeout_secs)?,
            base_url: http::parse_base_url(&config.url)?,
            credentials: config.username.clone().map(|username| Credentials {
                username,
                password: config.password.clone(),
            }),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(c) => request.basic_auth(&c.username, c.password.as_deref()),
            None => request,
        }
    }
}

#[async_trait]
impl PluginAdapter for ElasticsearchExecutor {
    fn name(&self) -> &str {
        "elasticsearch"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Search
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatlyticsError> {
        let url = http::join_segments(&self.base_url, &["_cluster", "health"])?;
        let request = self.authorize(self.client.get(url));
        let health: ClusterHealth = match http::send_json(request, "cluster health").await {
            Ok(health) => health,
            Err(e) => return Ok(HealthStatus::Unhealthy(e.to_string())),
        };

        Ok(match health.status.as_str() {
            "green" => HealthStatus::Healthy,
            "yellow" => HealthStatus::Degraded("cluster status yellow".into()),
            other => HealthStatus::Unhealthy(format!("cluster status {other}")),
        })
    }

    async fn shutdown(&self) -> Result<(), ChatlyticsError> {
        Ok(())
    }
}

#[async_trait]
impl SearchExecutor for ElasticsearchExecutor {
    async fn search(&self, index: &str, body: Value) -> Result<Value, ChatlyticsError> {
        let url = http::join_segments(&self.base_url, &[index, "_search"])?;
        debug!(index, "executing search");
        let request = self.authorize(self.client.post(url).json(&body));
        http::send_json(request, "search").await
    }

    async fn index_document(
        &self,
        index: &str,
        id: &str,
        document: Value,
    ) -> Result<(), ChatlyticsError> {
        let url = http::join_segments(&self.base_url, &[index, "_doc", id])?;
        let request = self.authorize(self.client.put(url).json(&document));
        http::send(request, "index").await?;
        debug!(index, id, "document indexed");
        Ok(())
    }
}
