// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for Chatlytics.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`. [`SqliteStore`]
//! implements the analytics crate's `AnalyticStore`.

pub mod database;
pub mod migrations;
pub mod store;

pub use database::Database;
pub use store::SqliteStore;
