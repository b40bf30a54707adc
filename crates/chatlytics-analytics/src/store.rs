// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Analytic persistence contract and an in-memory implementation.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use chatlytics_core::{AdapterType, ChatlyticsError, HealthStatus, PluginAdapter};

use crate::analytic::{Analytic, check_result_kind};
use crate::result::AnalyticResult;

/// Persistence of analytic documents.
///
/// Writes replace a whole document by id; concurrent writers race and the
/// last one wins.
#[async_trait]
pub trait AnalyticStore: PluginAdapter {
    /// Persists a new analytic.
    async fn insert(&self, analytic: &Analytic) -> Result<(), ChatlyticsError>;

    /// Loads one analytic, `None` when the id is unknown.
    async fn get(&self, id: Uuid) -> Result<Option<Analytic>, ChatlyticsError>;

    /// Lists analytics, oldest first, optionally for one project.
    async fn list(&self, project: Option<&str>) -> Result<Vec<Analytic>, ChatlyticsError>;

    /// Replaces the stored result. Fails with `NotFound` for an unknown id.
    async fn save_result(&self, id: Uuid, result: &AnalyticResult) -> Result<(), ChatlyticsError>;

    /// Removes an analytic. Returns whether it existed.
    async fn delete(&self, id: Uuid) -> Result<bool, ChatlyticsError>;

    /// Ids of analytics whose window is moving.
    async fn moving_ids(&self) -> Result<Vec<Uuid>, ChatlyticsError>;
}

/// Process-local store, used by tests and `compute` runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    analytics: DashMap<Uuid, Analytic>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.analytics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analytics.is_empty()
    }
}

#[async_trait]
impl PluginAdapter for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatlyticsError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ChatlyticsError> {
        Ok(())
    }
}

#[async_trait]
impl AnalyticStore for InMemoryStore {
    async fn insert(&self, analytic: &Analytic) -> Result<(), ChatlyticsError> {
        self.analytics.insert(analytic.id, analytic.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Analytic>, ChatlyticsError> {
        Ok(self.analytics.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list(&self, project: Option<&str>) -> Result<Vec<Analytic>, ChatlyticsError> {
        let mut analytics: Vec<Analytic> = self
            .analytics
            .iter()
            .filter(|entry| project.is_none_or(|p| entry.descriptor.project() == p))
            .map(|entry| entry.value().clone())
            .collect();
        analytics.sort_by_key(|a| (a.created_at, a.id));
        Ok(analytics)
    }

    async fn save_result(&self, id: Uuid, result: &AnalyticResult) -> Result<(), ChatlyticsError> {
        let mut entry = self
            .analytics
            .get_mut(&id)
            .ok_or_else(|| ChatlyticsError::NotFound { id: id.to_string() })?;
        check_result_kind(&entry.descriptor, result)?;
        entry.updated_at = result.created_at();
        entry.result = Some(result.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ChatlyticsError> {
        Ok(self.analytics.remove(&id).is_some())
    }

    async fn moving_ids(&self) -> Result<Vec<Uuid>, ChatlyticsError> {
        Ok(self
            .analytics
            .iter()
            .filter(|entry| entry.is_recomputable())
            .map(|entry| *entry.key())
            .collect())
    }
}
