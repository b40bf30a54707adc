// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that serde attributes cannot express, such
//! as non-empty URLs and positive worker counts.

use crate::diagnostic::ConfigError;
use crate::model::ChatlyticsConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns all collected validation errors (does not fail fast).
pub fn validate_config(config: &ChatlyticsConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let mut non_empty = |key: &str, value: &str| {
        if value.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("{key} must not be empty"),
            });
        }
    };
    non_empty("search.url", &config.search.url);
    non_empty("search.messages_index", &config.search.messages_index);
    non_empty("task_manager.url", &config.task_manager.url);
    non_empty("storage.database_path", &config.storage.database_path);
    non_empty("gateway.host", &config.gateway.host);
    non_empty("analytics.fallback_intent", &config.analytics.fallback_intent);

    for (key, url) in [
        ("search.url", &config.search.url),
        ("task_manager.url", &config.task_manager.url),
    ] {
        let url = url.trim();
        if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::Validation {
                message: format!("{key} `{url}` must start with http:// or https://"),
            });
        }
    }

    if config.search.username.is_some() != config.search.password.is_some() {
        errors.push(ConfigError::Validation {
            message: "search.username and search.password must be set together".to_string(),
        });
    }

    let mut at_least_one = |key: &str, value: u64| {
        if value < 1 {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be at least 1, got {value}"),
            });
        }
    };
    at_least_one("search.timeout_secs", config.search.timeout_secs);
    at_least_one("task_manager.timeout_secs", config.task_manager.timeout_secs);
    at_least_one("scheduler.interval_secs", config.scheduler.interval_secs);
    at_least_one("scheduler.workers", config.scheduler.workers as u64);
    at_least_one(
        "analytics.engaged_min_requests",
        config.analytics.engaged_min_requests,
    );
    at_least_one("analytics.terms_size", config.analytics.terms_size as u64);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&ChatlyticsConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = ChatlyticsConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "storage.database_path"));
    }

    #[test]
    fn zero_workers_and_interval_fail_together() {
        let mut config = ChatlyticsConfig::default();
        config.scheduler.workers = 0;
        config.scheduler.interval_secs = 0;
        config.analytics.terms_size = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(has_error(&errors, "scheduler.workers"));
        assert!(has_error(&errors, "scheduler.interval_secs"));
        assert!(has_error(&errors, "analytics.terms_size"));
    }

    #[test]
    fn url_scheme_is_checked() {
        let mut config = ChatlyticsConfig::default();
        config.search.url = "localhost:9200".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "http://"));
    }

    #[test]
    fn credentials_come_in_pairs() {
        let mut config = ChatlyticsConfig::default();
        config.search.username = Some("elastic".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "set together"));

        config.search.password = Some("secret".to_string());
        assert!(validate_config(&config).is_ok());
    }
}
