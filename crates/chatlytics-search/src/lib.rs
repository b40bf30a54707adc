// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP collaborators for Chatlytics.
//!
//! [`ElasticsearchExecutor`] implements `SearchExecutor` against an
//! Elasticsearch-compatible cluster and [`HttpTaskManager`] implements
//! `TaskManagerClient` against the task manager's REST API.

mod http;

pub mod elastic;
pub mod task_manager;

pub use elastic::ElasticsearchExecutor;
pub use task_manager::HttpTaskManager;
