// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock task-manager client serving canned records.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use chatlytics_core::{
    AdapterType, ChatlyticsError, HealthStatus, PluginAdapter, TaskManagerClient, TaskQuery,
    TaskRecord, TransactionRecord,
};

/// Returns the configured tasks and transactions for every query.
///
/// Transactions are filtered by `task_id` when the query names one, the way
/// the real service does. Every query is recorded.
#[derive(Clone, Default)]
pub struct MockTaskManager {
    tasks: Arc<Mutex<Vec<TaskRecord>>>,
    transactions: Arc<Mutex<Vec<TransactionRecord>>>,
    queries: Arc<Mutex<Vec<TaskQuery>>>,
}

impl MockTaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(tasks: Vec<TaskRecord>, transactions: Vec<TransactionRecord>) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(tasks)),
            transactions: Arc::new(Mutex::new(transactions)),
            queries: Arc::default(),
        }
    }

    pub async fn queries(&self) -> Vec<TaskQuery> {
        self.queries.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockTaskManager {
    fn name(&self) -> &str {
        "mock-task-manager"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::TaskManager
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatlyticsError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ChatlyticsError> {
        Ok(())
    }
}

#[async_trait]
impl TaskManagerClient for MockTaskManager {
    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<TaskRecord>, ChatlyticsError> {
        self.queries.lock().await.push(query.clone());
        Ok(self.tasks.lock().await.clone())
    }

    async fn list_transactions(
        &self,
        query: &TaskQuery,
    ) -> Result<Vec<TransactionRecord>, ChatlyticsError> {
        self.queries.lock().await.push(query.clone());
        let transactions = self.transactions.lock().await;
        Ok(transactions
            .iter()
            .filter(|t| query.task_id.as_ref().is_none_or(|id| &t.task_id == id))
            .cloned()
            .collect())
    }
}
