// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Analytic lifecycle: create, compute, read, delete.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use chatlytics_core::ChatlyticsError;

use crate::analytic::Analytic;
use crate::builder::DescriptorBuilder;
use crate::compute::ComputeEngine;
use crate::descriptor::AnalyticDescriptor;
use crate::store::AnalyticStore;

/// Drives analytics through `Pending -> Computed -> Deleted`.
#[derive(Clone)]
pub struct AnalyticService {
    store: Arc<dyn AnalyticStore>,
    engine: ComputeEngine,
}

impl AnalyticService {
    pub fn new(store: Arc<dyn AnalyticStore>, engine: ComputeEngine) -> Self {
        Self { store, engine }
    }

    pub fn engine(&self) -> &ComputeEngine {
        &self.engine
    }

    /// Validate a descriptor document and persist a pending analytic.
    ///
    /// Validation happens before anything is stored or executed.
    pub async fn create(&self, raw: &Value) -> Result<Analytic, ChatlyticsError> {
        let descriptor = DescriptorBuilder::build(raw)?;
        self.create_descriptor(descriptor).await
    }

    pub async fn create_descriptor(
        &self,
        descriptor: AnalyticDescriptor,
    ) -> Result<Analytic, ChatlyticsError> {
        let analytic = Analytic::new(descriptor);
        self.store.insert(&analytic).await?;
        info!(
            id = %analytic.id,
            kind = %analytic.descriptor.kind(),
            project = analytic.descriptor.project(),
            "analytic created"
        );
        Ok(analytic)
    }

    /// Create an analytic and compute it at once.
    ///
    /// When the first computation fails the pending analytic is removed
    /// again and the computation error is returned, so a failed create
    /// stores nothing.
    pub async fn create_computed(&self, raw: &Value) -> Result<Analytic, ChatlyticsError> {
        let analytic = self.create(raw).await?;
        match self.compute(analytic.id).await {
            Ok(computed) => Ok(computed),
            Err(err) => {
                warn!(
                    id = %analytic.id,
                    error = %err,
                    "initial computation failed, discarding analytic"
                );
                if let Err(cleanup) = self.store.delete(analytic.id).await {
                    warn!(id = %analytic.id, error = %cleanup, "failed to discard analytic");
                }
                Err(err)
            }
        }
    }

    /// Compute (or recompute) an analytic and persist the fresh result.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn compute(&self, id: Uuid) -> Result<Analytic, ChatlyticsError> {
        let mut analytic = self.get(id).await?;
        let result = self.engine.compute(&analytic.descriptor).await?;
        self.store.save_result(id, &result).await?;
        analytic.attach_result(result)?;
        info!(state = %analytic.state(), "analytic computed");
        Ok(analytic)
    }

    pub async fn get(&self, id: Uuid) -> Result<Analytic, ChatlyticsError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ChatlyticsError::NotFound { id: id.to_string() })
    }

    pub async fn list(&self, project: Option<&str>) -> Result<Vec<Analytic>, ChatlyticsError> {
        self.store.list(project).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ChatlyticsError> {
        if !self.store.delete(id).await? {
            return Err(ChatlyticsError::NotFound { id: id.to_string() });
        }
        info!(id = %id, "analytic deleted");
        Ok(())
    }

    /// Ids the scheduler should refresh.
    pub async fn moving_ids(&self) -> Result<Vec<Uuid>, ChatlyticsError> {
        self.store.moving_ids().await
    }
}
