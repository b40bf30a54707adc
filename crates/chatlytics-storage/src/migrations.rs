// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary and applied
//! when a [`Database`](crate::Database) is opened.

use chatlytics_core::ChatlyticsError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
///
/// Refinery tracks applied migrations in `refinery_schema_history`.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), ChatlyticsError> {
    embedded::migrations::runner()
        .run(conn)
        .map_err(|e| ChatlyticsError::Storage {
            source: Box::new(e),
        })?;
    Ok(())
}
