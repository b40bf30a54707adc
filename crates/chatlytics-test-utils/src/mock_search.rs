// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock search executor for deterministic testing.
//!
//! `MockSearchExecutor` implements `SearchExecutor` with pre-configured
//! responses and records every request, so tests can assert both on the
//! query bodies sent and on whether the executor was touched at all.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use chatlytics_core::{AdapterType, ChatlyticsError, HealthStatus, PluginAdapter, SearchExecutor};

/// One recorded `search` call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCall {
    pub index: String,
    pub body: Value,
}

/// One recorded `index_document` call.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedDocument {
    pub index: String,
    pub id: String,
    pub document: Value,
}

enum Scripted {
    Response(Value),
    Failure(String),
}

/// A mock search executor.
///
/// Responses are popped from a FIFO queue. When the queue is empty an empty
/// object `{}` is returned, which readers treat as "no matching data".
#[derive(Clone, Default)]
pub struct MockSearchExecutor {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    calls: Arc<Mutex<Vec<SearchCall>>>,
    indexed: Arc<Mutex<Vec<IndexedDocument>>>,
    fail_indexing: Arc<Mutex<Option<String>>>,
}

impl MockSearchExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<Value>) -> Self {
        let script = responses.into_iter().map(Scripted::Response).collect();
        Self {
            script: Arc::new(Mutex::new(script)),
            ..Self::default()
        }
    }

    /// Queue a raw response.
    pub async fn push_response(&self, response: Value) {
        self.script.lock().await.push_back(Scripted::Response(response));
    }

    /// Queue `{"aggregations": {"type_count": {"value": value}}}`.
    pub async fn push_value(&self, value: f64) {
        self.push_response(json!({ "aggregations": { "type_count": { "value": value } } }))
            .await;
    }

    /// Queue a `type_count` bucket list from `(key, doc_count)` pairs.
    pub async fn push_buckets(&self, buckets: &[(&str, u64)]) {
        let buckets: Vec<Value> = buckets
            .iter()
            .map(|(key, count)| json!({ "key": key, "doc_count": count }))
            .collect();
        self.push_response(json!({ "aggregations": { "type_count": { "buckets": buckets } } }))
            .await;
    }

    /// Queue one page of a composite key scan. `after` becomes the page's
    /// `after_key`; `None` marks the last page.
    pub async fn push_key_page(&self, keys: &[(&str, u64)], after: Option<&str>) {
        let buckets: Vec<Value> = keys
            .iter()
            .map(|(key, count)| json!({ "key": { "key": key }, "doc_count": count }))
            .collect();
        let mut aggregation = json!({ "buckets": buckets });
        if let Some(after) = after {
            aggregation["after_key"] = json!({ "key": after });
        }
        self.push_response(json!({ "aggregations": { "type_count": aggregation } }))
            .await;
    }

    /// Queue a transport failure.
    pub async fn push_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Failure(message.into()));
    }

    /// Make every subsequent `index_document` call fail.
    pub async fn fail_indexing(&self, message: impl Into<String>) {
        *self.fail_indexing.lock().await = Some(message.into());
    }

    pub async fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    pub async fn indexed(&self) -> Vec<IndexedDocument> {
        self.indexed.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockSearchExecutor {
    fn name(&self) -> &str {
        "mock-search"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Search
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatlyticsError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ChatlyticsError> {
        Ok(())
    }
}

#[async_trait]
impl SearchExecutor for MockSearchExecutor {
    async fn search(&self, index: &str, body: Value) -> Result<Value, ChatlyticsError> {
        self.calls.lock().await.push(SearchCall {
            index: index.to_string(),
            body,
        });
        match self.script.lock().await.pop_front() {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Failure(message)) => Err(ChatlyticsError::Executor {
                message,
                source: None,
            }),
            None => Ok(json!({})),
        }
    }

    async fn index_document(
        &self,
        index: &str,
        id: &str,
        document: Value,
    ) -> Result<(), ChatlyticsError> {
        if let Some(message) = self.fail_indexing.lock().await.clone() {
            return Err(ChatlyticsError::Executor {
                message,
                source: None,
            });
        }
        self.indexed.lock().await.push(IndexedDocument {
            index: index.to_string(),
            id: id.to_string(),
            document,
        });
        Ok(())
    }
}
