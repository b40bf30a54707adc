// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and migrations.
//!
//! All statements are serialized through tokio-rusqlite's single background
//! thread. Do NOT open extra connections for writes.

use std::path::Path;

use chatlytics_core::ChatlyticsError;
use tracing::{debug, info};

use crate::migrations;

/// Convert a tokio-rusqlite error into `ChatlyticsError::Storage`.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ChatlyticsError {
    ChatlyticsError::Storage {
        source: Box::new(e),
    }
}

/// A migrated SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database file and applies migrations.
    pub async fn open(path: impl AsRef<Path>, wal_mode: bool) -> Result<Self, ChatlyticsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ChatlyticsError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| ChatlyticsError::Storage {
                source: Box::new(e),
            })?;
        let db = Self::prepare(conn, wal_mode).await?;
        info!(path = %path.display(), wal_mode, "database opened");
        Ok(db)
    }

    /// Opens a private in-memory database, mostly for tests and one-off runs.
    pub async fn open_in_memory() -> Result<Self, ChatlyticsError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| ChatlyticsError::Storage {
                source: Box::new(e),
            })?;
        Self::prepare(conn, false).await
    }

    async fn prepare(
        conn: tokio_rusqlite::Connection,
        wal_mode: bool,
    ) -> Result<Self, ChatlyticsError> {
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
            }
            conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(|e| match e {
                tokio_rusqlite::Error::Error(inner) => inner,
                other => ChatlyticsError::Storage {
                    source: Box::new(other),
                },
            })?;
        debug!("migrations applied");

        Ok(Self { conn })
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL and closes the connection.
    pub async fn close(self) -> Result<(), ChatlyticsError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(map_tr_err)
    }
}
