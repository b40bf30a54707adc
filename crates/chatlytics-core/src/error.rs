// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Chatlytics analytics backend.

use thiserror::Error;

/// Reasons an analytic descriptor or ingested document is rejected.
///
/// Every variant is raised while the document is being parsed, before any
/// query executor is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The `type` field names no known descriptor family.
    #[error("unrecognized descriptor type `{0}`")]
    UnrecognizedDescriptorType(String),

    /// The `dimension` field names no known dimension.
    #[error("unrecognized dimension `{0}`")]
    UnrecognizedDimension(String),

    /// The metric is not in the allow-list of its (type, dimension) pair.
    #[error("unknown metric `{metric}` for {kind} dimension `{dimension}`")]
    UnknownMetric {
        kind: String,
        dimension: String,
        metric: String,
    },

    /// The `aggregation` field names no supported aggregation kind.
    #[error("unknown aggregation kind `{0}`")]
    UnknownAggregation(String),

    /// A filter carries an operation outside the supported set.
    #[error("unknown filter operation `{0}`")]
    UnknownFilterOperation(String),

    /// A moving time window names a unit that cannot be resolved.
    #[error("unsupported time unit `{0}`")]
    UnsupportedTimeUnit(String),

    /// A required field is absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A field is present but malformed.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// The primary error type used across Chatlytics crates.
#[derive(Debug, Error)]
pub enum ChatlyticsError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// A descriptor or ingested document failed validation or names an unknown variant.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// The referenced analytic does not exist.
    #[error("analytic {id} not found")]
    NotFound { id: String },

    /// A search or task-manager call failed (transport, timeout, bad status).
    #[error("executor error: {message}")]
    Executor {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChatlyticsError {
    /// Build an executor error from a message and an underlying cause.
    pub fn executor(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Executor {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether the caller sent something unacceptable (4xx family).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound { .. })
    }
}
