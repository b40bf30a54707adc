// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use chatlytics_analytics::{Analytic, ChatMessage};
use chatlytics_core::{ChatlyticsError, ValidationError};

use crate::error::ApiError;
use crate::server::{GatewayState, HealthState};

/// Query string of `POST /v1/analytics`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateParams {
    /// Store the analytic without computing it.
    #[serde(default)]
    pub defer: bool,
}

/// Query string of `GET /v1/analytics`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub project: Option<String>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Response body for POST /v1/messages.
#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub indexed: usize,
}

fn body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        ApiError(
            ValidationError::InvalidField {
                field: "body",
                reason: rejection.body_text(),
            }
            .into(),
        )
    })
}

fn parse_message(raw: Value) -> Result<ChatMessage, ApiError> {
    serde_json::from_value(raw).map_err(|e| {
        ApiError(ChatlyticsError::from(ValidationError::InvalidField {
            field: "message",
            reason: e.to_string(),
        }))
    })
}

/// POST /v1/analytics
///
/// Creates the analytic and, unless `?defer=true`, computes it right away.
/// A failed computation stores nothing and returns the error.
pub async fn create_analytic(
    State(state): State<GatewayState>,
    Query(params): Query<CreateParams>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Analytic>), ApiError> {
    let raw = body(payload)?;
    let analytic = if params.defer {
        state.service.create(&raw).await?
    } else {
        state.service.create_computed(&raw).await?
    };
    Ok((StatusCode::CREATED, Json(analytic)))
}

/// GET /v1/analytics
pub async fn list_analytics(
    State(state): State<GatewayState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Analytic>>, ApiError> {
    Ok(Json(state.service.list(params.project.as_deref()).await?))
}

/// GET /v1/analytics/{id}
pub async fn get_analytic(
    State(state): State<GatewayState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Analytic>, ApiError> {
    Ok(Json(state.service.get(id).await?))
}

/// POST /v1/analytics/{id}/compute
pub async fn compute_analytic(
    State(state): State<GatewayState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Analytic>, ApiError> {
    Ok(Json(state.service.compute(id).await?))
}

/// DELETE /v1/analytics/{id}
pub async fn delete_analytic(
    State(state): State<GatewayState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/messages
///
/// Takes one message or an array. The whole batch is validated before
/// anything is indexed.
pub async fn post_messages(
    State(state): State<GatewayState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<IngestResponse>, ApiError> {
    let messages: Vec<ChatMessage> = match body(payload)? {
        Value::Array(items) => items
            .into_iter()
            .map(parse_message)
            .collect::<Result<_, _>>()?,
        single => vec![parse_message(single)?],
    };
    let indexed = state.ingestor.ingest_batch(&messages).await?;
    Ok(Json(IngestResponse { indexed }))
}

/// GET /health
pub async fn get_public_health(State(health): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: health.start_time.elapsed().as_secs(),
    })
}

/// GET /metrics
///
/// Prometheus text format, or 404 when the exporter is disabled.
pub async fn get_public_metrics(State(health): State<HealthState>) -> Response {
    match &health.prometheus_render {
        Some(render) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
