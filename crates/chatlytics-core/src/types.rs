// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Chatlytics crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Search,
    TaskManager,
    Storage,
    Observability,
}

// --- Task manager contract types ---

/// Filter sent to the external task manager.
///
/// `creation_from` is `None` when the analytic window has no lower bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Application (project) identifier.
    pub app_id: String,
    /// Inclusive lower bound on the record's creation time.
    pub creation_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the record's creation time.
    pub creation_to: DateTime<Utc>,
    /// Restrict transactions to a single task.
    pub task_id: Option<String>,
}

/// A task as reported by the task manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: String,
    pub label: String,
    pub creation_ts: DateTime<Utc>,
    #[serde(default)]
    pub close_ts: Option<DateTime<Utc>>,
}

/// A transaction (one execution of a task) as reported by the task manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub task_id: String,
    pub label: String,
    pub creation_ts: DateTime<Utc>,
    #[serde(default)]
    pub close_ts: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// A task is open until the task manager reports a close timestamp.
    pub fn is_open(&self) -> bool {
        self.close_ts.is_none()
    }
}

impl TransactionRecord {
    pub fn is_open(&self) -> bool {
        self.close_ts.is_none()
    }
}
