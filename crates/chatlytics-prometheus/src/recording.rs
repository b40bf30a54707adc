// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any installed recorder collects these.

use metrics::{describe_counter, describe_histogram};

/// Register all Chatlytics metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "chatlytics_computations_total",
        "Analytic computations by descriptor kind and outcome"
    );
    describe_counter!(
        "chatlytics_messages_ingested_total",
        "Chat messages written to the messages index"
    );
    describe_counter!(
        "chatlytics_recompute_jobs_total",
        "Scheduled recompute jobs by outcome"
    );
    describe_histogram!(
        "chatlytics_computation_seconds",
        "Wall time of a single analytic computation"
    );
}

/// Record a finished computation.
pub fn record_computation(kind: &str, outcome: &str, seconds: f64) {
    metrics::counter!(
        "chatlytics_computations_total",
        "kind" => kind.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    metrics::histogram!("chatlytics_computation_seconds", "kind" => kind.to_string())
        .record(seconds);
}

/// Record an indexed message.
pub fn record_ingested(message_type: &'static str) {
    metrics::counter!("chatlytics_messages_ingested_total", "type" => message_type).increment(1);
}

/// Record a scheduled recompute job.
pub fn record_recompute_job(outcome: &'static str) {
    metrics::counter!("chatlytics_recompute_jobs_total", "outcome" => outcome).increment(1);
}
