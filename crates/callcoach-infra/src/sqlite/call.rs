//! SQLite call repository implementation.

use sqlx::Row;

use callcoach_core::repository::call::CallRepository;
use callcoach_types::call::CallRecord;
use callcoach_types::error::RepositoryError;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `CallRepository`.
#[derive(Clone)]
pub struct SqliteCallRepository {
    pool: DatabasePool,
}

impl SqliteCallRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct CallRow {
    call_id: String,
    title: String,
    rep_id: String,
    rep_name: String,
    start_time: String,
    duration_sec: i64,
    source_url: Option<String>,
    synced_at: String,
}

impl CallRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            call_id: row.try_get("call_id")?,
            title: row.try_get("title")?,
            rep_id: row.try_get("rep_id")?,
            rep_name: row.try_get("rep_name")?,
            start_time: row.try_get("start_time")?,
            duration_sec: row.try_get("duration_sec")?,
            source_url: row.try_get("source_url")?,
            synced_at: row.try_get("synced_at")?,
        })
    }

    fn into_call(self) -> Result<CallRecord, RepositoryError> {
        let duration_sec = u32::try_from(self.duration_sec).map_err(|_| {
            RepositoryError::Query(format!("invalid duration: {}", self.duration_sec))
        })?;
        Ok(CallRecord {
            start_time: parse_datetime(&self.start_time)?,
            synced_at: parse_datetime(&self.synced_at)?,
            call_id: self.call_id,
            title: self.title,
            rep_id: self.rep_id,
            rep_name: self.rep_name,
            duration_sec,
            source_url: self.source_url,
        })
    }
}

fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<CallRecord, RepositoryError> {
    CallRow::from_row(row).map_err(query_error)?.into_call()
}

impl CallRepository for SqliteCallRepository {
    async fn get_call(&self, call_id: &str) -> Result<Option<CallRecord>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM calls WHERE call_id = ?")
            .bind(call_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.as_ref().map(map_row).transpose()
    }

    async fn list_calls(&self) -> Result<Vec<CallRecord>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM calls ORDER BY start_time DESC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter().map(map_row).collect()
    }

    async fn upsert_call(&self, call: &CallRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO calls (call_id, title, rep_id, rep_name, start_time, duration_sec, source_url, synced_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(call_id) DO UPDATE SET
                title = excluded.title,
                rep_id = excluded.rep_id,
                rep_name = excluded.rep_name,
                start_time = excluded.start_time,
                duration_sec = excluded.duration_sec,
                source_url = excluded.source_url,
                synced_at = excluded.synced_at",
        )
        .bind(&call.call_id)
        .bind(&call.title)
        .bind(&call.rep_id)
        .bind(&call.rep_name)
        .bind(format_datetime(&call.start_time))
        .bind(i64::from(call.duration_sec))
        .bind(&call.source_url)
        .bind(format_datetime(&call.synced_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }
}
