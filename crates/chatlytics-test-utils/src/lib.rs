// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Chatlytics integration tests.
//!
//! Provides mock collaborators for fast, deterministic, CI-runnable tests
//! without a search cluster or task-manager service.
//!
//! # Components
//!
//! - [`MockSearchExecutor`] - Scripted search responses; records every call
//! - [`MockTaskManager`] - Canned task and transaction lists
//! - [`fixtures`] - Descriptor and message documents used across suites

pub mod fixtures;
pub mod mock_search;
pub mod mock_task_manager;

pub use mock_search::{IndexedDocument, MockSearchExecutor, SearchCall};
pub use mock_task_manager::MockTaskManager;
