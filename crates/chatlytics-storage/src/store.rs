// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of [`AnalyticStore`].
//!
//! Descriptors and results are stored as JSON text in their published
//! representations. `project`, `kind` and `moving` are denormalized from the
//! descriptor so listing and scheduling never parse JSON.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;
use uuid::Uuid;

use chatlytics_analytics::analytic::check_result_kind;
use chatlytics_analytics::{Analytic, AnalyticResult, AnalyticStore};
use chatlytics_core::{AdapterType, ChatlyticsError, HealthStatus, PluginAdapter};

use crate::database::{Database, map_tr_err};

const SELECT_COLUMNS: &str = "SELECT id, descriptor, result, created_at, updated_at FROM analytics";

/// Raw column values, decoded outside the connection thread.
struct StoredRow {
    id: String,
    descriptor: String,
    result: Option<String>,
    created_at: String,
    updated_at: String,
}

impl StoredRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            descriptor: row.get(1)?,
            result: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn decode(self) -> Result<Analytic, ChatlyticsError> {
        let id = Uuid::parse_str(&self.id).map_err(storage_err)?;
        let descriptor = serde_json::from_str(&self.descriptor).map_err(storage_err)?;
        let result = self
            .result
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(storage_err)?;
        Ok(Analytic {
            id,
            descriptor,
            result,
            created_at: parse_instant(&self.created_at)?,
            updated_at: parse_instant(&self.updated_at)?,
        })
    }
}

fn storage_err(e: impl std::error::Error + Send + Sync + 'static) -> ChatlyticsError {
    ChatlyticsError::Storage {
        source: Box::new(e),
    }
}

// Fixed-width UTC text sorts chronologically.
fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_instant(text: &str) -> Result<DateTime<Utc>, ChatlyticsError> {
    DateTime::parse_from_rfc3339(text)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(storage_err)
}

/// SQLite-backed analytic store.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Opens the database at `path` and wraps it.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, ChatlyticsError> {
        Ok(Self::new(Database::open(path, wal_mode).await?))
    }

    async fn query_rows(
        &self,
        sql: String,
        param: Option<String>,
    ) -> Result<Vec<Analytic>, ChatlyticsError> {
        let rows = self
            .db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = match param {
                    Some(param) => stmt
                        .query_map(rusqlite::params![param], StoredRow::from_row)?
                        .collect::<Result<Vec<_>, _>>()?,
                    None => stmt
                        .query_map([], StoredRow::from_row)?
                        .collect::<Result<Vec<_>, _>>()?,
                };
                Ok(rows)
            })
            .await
            .map_err(map_tr_err)?;
        rows.into_iter().map(StoredRow::decode).collect()
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatlyticsError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ChatlyticsError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl AnalyticStore for SqliteStore {
    async fn insert(&self, analytic: &Analytic) -> Result<(), ChatlyticsError> {
        let id = analytic.id.to_string();
        let project = analytic.descriptor.project().to_string();
        let kind = analytic.descriptor.kind().to_string();
        let moving = analytic.is_recomputable();
        let descriptor = serde_json::to_string(&analytic.descriptor).map_err(storage_err)?;
        let result = analytic
            .result
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(storage_err)?;
        let created_at = format_instant(analytic.created_at);
        let updated_at = format_instant(analytic.updated_at);

        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO analytics (id, project, kind, moving, descriptor, result, \
                     created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    rusqlite::params![
                        id, project, kind, moving, descriptor, result, created_at, updated_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        debug!(analytic_id = %analytic.id, "analytic row inserted");
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Analytic>, ChatlyticsError> {
        let rows = self
            .query_rows(format!("{SELECT_COLUMNS} WHERE id = ?1"), Some(id.to_string()))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list(&self, project: Option<&str>) -> Result<Vec<Analytic>, ChatlyticsError> {
        match project {
            Some(project) => {
                self.query_rows(
                    format!("{SELECT_COLUMNS} WHERE project = ?1 ORDER BY created_at, id"),
                    Some(project.to_string()),
                )
                .await
            }
            None => {
                self.query_rows(format!("{SELECT_COLUMNS} ORDER BY created_at, id"), None)
                    .await
            }
        }
    }

    async fn save_result(&self, id: Uuid, result: &AnalyticResult) -> Result<(), ChatlyticsError> {
        let stored = self
            .get(id)
            .await?
            .ok_or_else(|| ChatlyticsError::NotFound { id: id.to_string() })?;
        check_result_kind(&stored.descriptor, result)?;

        let key = id.to_string();
        let body = serde_json::to_string(result).map_err(storage_err)?;
        let updated_at = format_instant(result.created_at());
        let changed = self
            .db
            .connection()
            .call(move |conn| {
                let changed = conn.execute(
                    "UPDATE analytics SET result = ?2, updated_at = ?3 WHERE id = ?1",
                    rusqlite::params![key, body, updated_at],
                )?;
                Ok(changed)
            })
            .await
            .map_err(map_tr_err)?;

        // Deleted between the read and the write.
        if changed == 0 {
            return Err(ChatlyticsError::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ChatlyticsError> {
        let key = id.to_string();
        let removed = self
            .db
            .connection()
            .call(move |conn| {
                let removed = conn.execute("DELETE FROM analytics WHERE id = ?1", rusqlite::params![key])?;
                Ok(removed)
            })
            .await
            .map_err(map_tr_err)?;
        Ok(removed > 0)
    }

    async fn moving_ids(&self) -> Result<Vec<Uuid>, ChatlyticsError> {
        let ids = self
            .db
            .connection()
            .call(|conn| {
                let mut stmt =
                    conn.prepare("SELECT id FROM analytics WHERE moving = 1 ORDER BY created_at")?;
                let ids = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ids)
            })
            .await
            .map_err(map_tr_err)?;
        ids.iter()
            .map(|id| Uuid::parse_str(id).map_err(storage_err))
            .collect()
    }
}
