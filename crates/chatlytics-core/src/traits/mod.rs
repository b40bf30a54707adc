// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod search;
pub mod task_manager;

pub use adapter::PluginAdapter;
pub use search::SearchExecutor;
pub use task_manager::TaskManagerClient;
