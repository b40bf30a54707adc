// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External task manager contract.

use async_trait::async_trait;

use crate::error::ChatlyticsError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{TaskQuery, TaskRecord, TransactionRecord};

/// Client for the task manager that owns bot tasks and their transactions.
#[async_trait]
pub trait TaskManagerClient: PluginAdapter {
    /// Lists tasks created inside the query window.
    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<TaskRecord>, ChatlyticsError>;

    /// Lists transactions created inside the query window, optionally for one task.
    async fn list_transactions(
        &self,
        query: &TaskQuery,
    ) -> Result<Vec<TransactionRecord>, ChatlyticsError>;
}
