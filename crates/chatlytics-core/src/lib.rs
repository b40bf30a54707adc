// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Chatlytics analytics backend.
//!
//! This crate provides the shared error taxonomy, the collaborator contracts
//! that the analytics engine depends on (search executor, task manager), and
//! the record types exchanged across those contracts. Concrete transports
//! live in other crates and implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ChatlyticsError, ValidationError};
pub use types::{AdapterType, HealthStatus, TaskQuery, TaskRecord, TransactionRecord};

// Re-export all adapter traits at crate root.
pub use traits::{PluginAdapter, SearchExecutor, TaskManagerClient};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_type_display_round_trips() {
        use std::str::FromStr;

        let variants = [
            AdapterType::Search,
            AdapterType::TaskManager,
            AdapterType::Storage,
            AdapterType::Observability,
        ];

        for variant in &variants {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(*variant, parsed);
        }
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        let degraded = HealthStatus::Degraded("slow".into());
        let unhealthy = HealthStatus::Unhealthy("down".into());

        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(degraded, healthy);
        assert_ne!(unhealthy, healthy);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_search_executor<T: SearchExecutor>() {}
        fn _assert_task_manager<T: TaskManagerClient>() {}
    }
}
