// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `chatlytics compute` command implementation.
//!
//! Builds one descriptor from a JSON file and computes it against the
//! configured collaborators without touching storage.

use std::path::Path;

use tracing::info;

use chatlytics_analytics::{AnalyticResult, DescriptorBuilder};
use chatlytics_config::ChatlyticsConfig;
use chatlytics_core::{ChatlyticsError, ValidationError};

use crate::adapters::Collaborators;

/// Computes the descriptor in `path` and prints the result document.
pub async fn run_compute(config: &ChatlyticsConfig, path: &Path) -> Result<(), ChatlyticsError> {
    let result = compute_file(config, path).await?;
    let rendered = serde_json::to_string_pretty(&result)
        .map_err(|e| ChatlyticsError::Internal(format!("failed to render result: {e}")))?;
    println!("{rendered}");
    Ok(())
}

pub async fn compute_file(
    config: &ChatlyticsConfig,
    path: &Path,
) -> Result<AnalyticResult, ChatlyticsError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ChatlyticsError::Config(format!("cannot read descriptor {}: {e}", path.display()))
    })?;
    let raw: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| ValidationError::InvalidField {
            field: "descriptor",
            reason: e.to_string(),
        })?;
    let descriptor = DescriptorBuilder::build(&raw)?;

    let collaborators = Collaborators::from_config(config)?;
    info!(kind = %descriptor.kind(), project = descriptor.project(), "computing descriptor");
    collaborators.engine(config).compute(&descriptor).await
}
