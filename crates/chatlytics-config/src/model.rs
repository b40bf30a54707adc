// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Chatlytics.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Chatlytics configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Every section is optional and defaults sensibly.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatlyticsConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Search cluster holding the messages index.
    #[serde(default)]
    pub search: SearchConfig,

    /// External task-manager API.
    #[serde(default)]
    pub task_manager: TaskManagerConfig,

    /// Analytic persistence.
    #[serde(default)]
    pub storage: StorageConfig,

    /// REST gateway.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Background recomputation of moving-window analytics.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Metric tunables.
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "chatlytics".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Search cluster configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Base URL, e.g. `http://localhost:9200`.
    #[serde(default = "default_search_url")]
    pub url: String,

    /// Index chat messages are written to and queried from.
    #[serde(default = "default_messages_index")]
    pub messages_index: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Basic-auth user. No auth when unset.
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: default_search_url(),
            messages_index: default_messages_index(),
            timeout_secs: default_timeout_secs(),
            username: None,
            password: None,
        }
    }
}

fn default_search_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_messages_index() -> String {
    "messages".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Task-manager API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TaskManagerConfig {
    #[serde(default = "default_task_manager_url")]
    pub url: String,

    /// Sent as a bearer token when set.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TaskManagerConfig {
    fn default() -> Self {
        Self {
            url: default_task_manager_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_task_manager_url() -> String {
    "http://localhost:8081".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable Write-Ahead Logging mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("chatlytics").join("chatlytics.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("chatlytics.db"))
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// REST gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Required on `/v1/*`. Requests are rejected while unset.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Recompute scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    #[serde(default = "default_scheduler_enabled")]
    pub enabled: bool,

    /// Seconds between recompute passes.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Concurrent recompute workers.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_scheduler_enabled(),
            interval_secs: default_interval_secs(),
            workers: default_workers(),
        }
    }
}

fn default_scheduler_enabled() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    900
}

fn default_workers() -> usize {
    4
}

/// Metric tunables.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyticsConfig {
    /// Requests a user needs inside the window to count as engaged.
    #[serde(default = "default_engaged_min_requests")]
    pub engaged_min_requests: u64,

    /// Intent name marking an unrecognized request.
    #[serde(default = "default_fallback_intent")]
    pub fallback_intent: String,

    /// Bucket limit of terms aggregations.
    #[serde(default = "default_terms_size")]
    pub terms_size: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            engaged_min_requests: default_engaged_min_requests(),
            fallback_intent: default_fallback_intent(),
            terms_size: default_terms_size(),
        }
    }
}

fn default_engaged_min_requests() -> u64 {
    3
}

fn default_fallback_intent() -> String {
    "default".to_string()
}

fn default_terms_size() -> usize {
    10_000
}
