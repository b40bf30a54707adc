// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search executor contract.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ChatlyticsError;
use crate::traits::adapter::PluginAdapter;

/// Executes structured queries against the search engine holding the
/// message log.
///
/// Responses are returned raw. Callers read `aggregations.<name>.value` and
/// `aggregations.<name>.buckets[]` from them and must treat missing keys as
/// "no matching data". Transport failures are returned as
/// [`ChatlyticsError::Executor`] and are never retried here.
#[async_trait]
pub trait SearchExecutor: PluginAdapter {
    /// Runs a search body against `index` and returns the raw response.
    async fn search(&self, index: &str, body: Value) -> Result<Value, ChatlyticsError>;

    /// Stores (or replaces) a document under `id` in `index`.
    async fn index_document(
        &self,
        index: &str,
        id: &str,
        document: Value,
    ) -> Result<(), ChatlyticsError>;
}
