// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat message ingestion into the messages index.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use tracing::{debug, info};

use chatlytics_core::{ChatlyticsError, SearchExecutor, ValidationError};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Sent by a user.
    Request,
    /// Bot reply to a request.
    Response,
    /// Bot-initiated message.
    Notification,
}

/// NLU classification attached to a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub name: String,
    pub confidence: f64,
}

/// One logged chat message, as stored in the messages index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub project: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub user_id: String,
    pub conversation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "id",
                reason: "must not be empty".to_string(),
            });
        }
        if self.project.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "project",
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(intent) = &self.intent {
            if !(0.0..=1.0).contains(&intent.confidence) {
                return Err(ValidationError::InvalidField {
                    field: "intent.confidence",
                    reason: format!("must be within [0, 1], got {}", intent.confidence),
                });
            }
        }
        Ok(())
    }
}

/// Writes validated messages into the messages index, keyed by message id.
#[derive(Clone)]
pub struct MessageIngestor {
    search: Arc<dyn SearchExecutor>,
    index: String,
}

impl MessageIngestor {
    pub fn new(search: Arc<dyn SearchExecutor>, index: impl Into<String>) -> Self {
        Self {
            search,
            index: index.into(),
        }
    }

    pub async fn ingest(&self, message: &ChatMessage) -> Result<(), ChatlyticsError> {
        message.validate()?;
        self.write(message).await
    }

    /// Validate the whole batch, then index it in order.
    ///
    /// Nothing is written when any message is invalid.
    pub async fn ingest_batch(&self, messages: &[ChatMessage]) -> Result<usize, ChatlyticsError> {
        for message in messages {
            message.validate()?;
        }
        for message in messages {
            self.write(message).await?;
        }
        info!(count = messages.len(), index = %self.index, "messages ingested");
        Ok(messages.len())
    }

    async fn write(&self, message: &ChatMessage) -> Result<(), ChatlyticsError> {
        let document = serde_json::to_value(message)
            .map_err(|e| ChatlyticsError::Internal(format!("failed to encode message: {e}")))?;
        self.search
            .index_document(&self.index, &message.id, document)
            .await?;
        debug!(id = %message.id, message_type = %message.message_type, "message indexed");

        #[cfg(feature = "prometheus")]
        chatlytics_prometheus::record_ingested(message.message_type.into());

        Ok(())
    }
}
