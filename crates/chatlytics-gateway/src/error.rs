// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`ChatlyticsError`] to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use chatlytics_core::ChatlyticsError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A handler error rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub ChatlyticsError);

impl From<ChatlyticsError> for ApiError {
    fn from(err: ChatlyticsError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ChatlyticsError::Validation(_) => StatusCode::BAD_REQUEST,
            ChatlyticsError::NotFound { .. } => StatusCode::NOT_FOUND,
            ChatlyticsError::Executor { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, status = %status, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
