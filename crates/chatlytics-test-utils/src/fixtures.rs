// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Documents and records shared by test suites.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use chatlytics_core::{TaskRecord, TransactionRecord};

/// A count or segmentation descriptor over the last 30 days of project `p`.
pub fn dimension_descriptor(kind: &str, dimension: &str, metric: &str) -> Value {
    json!({
        "type": kind,
        "project": "p",
        "timespan": { "type": "moving", "value": "30d" },
        "dimension": dimension,
        "metric": metric,
    })
}

/// An aggregation descriptor over today's messages of project `p`.
pub fn aggregation_descriptor(aggregation: &str, field: &str) -> Value {
    json!({
        "type": "aggregation",
        "project": "p",
        "timespan": { "type": "moving", "value": "today" },
        "field": field,
        "aggregation": aggregation,
    })
}

/// A request message document for project `p`.
pub fn request_message(id: &str, user_id: &str) -> Value {
    json!({
        "id": id,
        "project": "p",
        "type": "request",
        "user_id": user_id,
        "conversation_id": format!("conv-{user_id}"),
        "channel": "web",
        "language": "en",
        "text": "hello",
        "intent": { "name": "greeting", "confidence": 0.8 },
        "timestamp": "2026-05-01T10:00:00Z",
    })
}

fn instant(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

pub fn task(task_id: &str, label: &str, closed: bool) -> TaskRecord {
    TaskRecord {
        task_id: task_id.to_string(),
        label: label.to_string(),
        creation_ts: instant("2026-05-01T09:00:00Z"),
        close_ts: closed.then(|| instant("2026-05-01T09:30:00Z")),
    }
}

pub fn transaction(transaction_id: &str, task_id: &str, closed: bool) -> TransactionRecord {
    TransactionRecord {
        transaction_id: transaction_id.to_string(),
        task_id: task_id.to_string(),
        label: "checkout".to_string(),
        creation_ts: instant("2026-05-01T09:00:00Z"),
        close_ts: closed.then(|| instant("2026-05-01T09:45:00Z")),
    }
}
