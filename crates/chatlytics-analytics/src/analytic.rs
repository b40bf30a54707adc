// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The persisted analytic entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use chatlytics_core::ChatlyticsError;

use crate::descriptor::AnalyticDescriptor;
use crate::result::AnalyticResult;

/// Lifecycle state derived from whether a result is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AnalyticState {
    Pending,
    Computed,
}

/// An `{id, descriptor, result}` triple.
///
/// The id is assigned once at creation. The result is replaced wholesale on
/// every computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytic {
    pub id: Uuid,
    pub descriptor: AnalyticDescriptor,
    pub result: Option<AnalyticResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Analytic {
    /// A fresh, pending analytic.
    pub fn new(descriptor: AnalyticDescriptor) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            descriptor,
            result: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn state(&self) -> AnalyticState {
        if self.result.is_some() {
            AnalyticState::Computed
        } else {
            AnalyticState::Pending
        }
    }

    /// Whether the scheduler should refresh this analytic.
    pub fn is_recomputable(&self) -> bool {
        self.descriptor.time_span().is_moving()
    }

    /// Replace the result. The result family must match the descriptor's.
    pub fn attach_result(&mut self, result: AnalyticResult) -> Result<(), ChatlyticsError> {
        check_result_kind(&self.descriptor, &result)?;
        self.updated_at = result.created_at();
        self.result = Some(result);
        Ok(())
    }
}

/// Rejects a result whose family differs from the descriptor's.
pub fn check_result_kind(
    descriptor: &AnalyticDescriptor,
    result: &AnalyticResult,
) -> Result<(), ChatlyticsError> {
    if descriptor.kind() != result.kind() {
        return Err(ChatlyticsError::Internal(format!(
            "{} result cannot be attached to a {} descriptor",
            result.kind(),
            descriptor.kind()
        )));
    }
    Ok(())
}
