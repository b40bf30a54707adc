// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the external task manager.

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{RequestBuilder, Url};
use tracing::debug;

use chatlytics_config::model::TaskManagerConfig;
use chatlytics_core::{
    AdapterType, ChatlyticsError, HealthStatus, PluginAdapter, TaskManagerClient, TaskQuery,
    TaskRecord, TransactionRecord,
};

use crate::http;

/// Task manager reached over HTTP.
///
/// `GET {url}/tasks` and `GET {url}/transactions` take the [`TaskQuery`]
/// fields as query parameters and answer with a JSON array of records.
#[derive(Debug, Clone)]
pub struct HttpTaskManager {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpTaskManager {
    pub fn new(config: &TaskManagerConfig) -> Result<Self, ChatlyticsError> {
        Ok(Self {
            client: http::build_client(config.timeout_secs)?,
            base_url: http::parse_base_url(&config.url)?,
            api_key: config.api_key.clone(),
        })
    }

    fn request(
        &self,
        resource: &str,
        query: Option<&TaskQuery>,
    ) -> Result<RequestBuilder, ChatlyticsError> {
        let mut url = http::join_segments(&self.base_url, &[resource])?;
        if let Some(query) = query {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("app_id", &query.app_id);
            if let Some(from) = query.creation_from {
                pairs.append_pair(
                    "creation_from",
                    &from.to_rfc3339_opts(SecondsFormat::Millis, true),
                );
            }
            pairs.append_pair(
                "creation_to",
                &query.creation_to.to_rfc3339_opts(SecondsFormat::Millis, true),
            );
            if let Some(task_id) = &query.task_id {
                pairs.append_pair("task_id", task_id);
            }
        }

        let request = self.client.get(url);
        Ok(match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        })
    }
}

#[async_trait]
impl PluginAdapter for HttpTaskManager {
    fn name(&self) -> &str {
        "task-manager"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::TaskManager
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatlyticsError> {
        match http::send(self.request("health", None)?, "task manager health").await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), ChatlyticsError> {
        Ok(())
    }
}

#[async_trait]
impl TaskManagerClient for HttpTaskManager {
    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<TaskRecord>, ChatlyticsError> {
        let tasks: Vec<TaskRecord> =
            http::send_json(self.request("tasks", Some(query))?, "task list").await?;
        debug!(app_id = %query.app_id, count = tasks.len(), "tasks listed");
        Ok(tasks)
    }

    async fn list_transactions(
        &self,
        query: &TaskQuery,
    ) -> Result<Vec<TransactionRecord>, ChatlyticsError> {
        let transactions: Vec<TransactionRecord> =
            http::send_json(self.request("transactions", Some(query))?, "transaction list")
                .await?;
        debug!(
            app_id = %query.app_id,
            count = transactions.len(),
            "transactions listed"
        );
        Ok(transactions)
    }
}
