//! SQLite rep ledger repository.

use sqlx::Row;

use callcoach_core::repository::ledger::LedgerRepository;
use callcoach_types::error::RepositoryError;
use callcoach_types::ledger::RepLedgerEntry;
use callcoach_types::skill::Skill;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `LedgerRepository`, keyed by
/// `(rep_id, skill_id)`.
#[derive(Clone)]
pub struct SqliteLedgerRepository {
    pool: DatabasePool,
}

impl SqliteLedgerRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct LedgerRow {
    rep_id: String,
    skill_id: String,
    rolling_score: f64,
    prev_rolling_score: f64,
    trend_delta: f64,
    last_updated: String,
    open_focus_area: bool,
}

impl LedgerRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            rep_id: row.try_get("rep_id")?,
            skill_id: row.try_get("skill_id")?,
            rolling_score: row.try_get("rolling_score")?,
            prev_rolling_score: row.try_get("prev_rolling_score")?,
            trend_delta: row.try_get("trend_delta")?,
            last_updated: row.try_get("last_updated")?,
            open_focus_area: row.try_get("open_focus_area")?,
        })
    }

    fn into_entry(self) -> Result<RepLedgerEntry, RepositoryError> {
        let skill: Skill = self
            .skill_id
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(RepLedgerEntry {
            rep_id: self.rep_id,
            skill,
            rolling_score: self.rolling_score,
            prev_rolling_score: self.prev_rolling_score,
            trend_delta: self.trend_delta,
            last_updated: parse_datetime(&self.last_updated)?,
            open_focus_area: self.open_focus_area,
        })
    }
}

fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<RepLedgerEntry, RepositoryError> {
    LedgerRow::from_row(row).map_err(query_error)?.into_entry()
}

impl LedgerRepository for SqliteLedgerRepository {
    async fn get(&self, rep_id: &str, skill: Skill) -> Result<Option<RepLedgerEntry>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM rep_ledger WHERE rep_id = ? AND skill_id = ?")
            .bind(rep_id)
            .bind(skill.as_str())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.as_ref().map(map_row).transpose()
    }

    async fn upsert(&self, entry: &RepLedgerEntry) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO rep_ledger (rep_id, skill_id, rolling_score, prev_rolling_score, trend_delta, last_updated, open_focus_area)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(rep_id, skill_id) DO UPDATE SET
                rolling_score = excluded.rolling_score,
                prev_rolling_score = excluded.prev_rolling_score,
                trend_delta = excluded.trend_delta,
                last_updated = excluded.last_updated,
                open_focus_area = excluded.open_focus_area",
        )
        .bind(&entry.rep_id)
        .bind(entry.skill.as_str())
        .bind(entry.rolling_score)
        .bind(entry.prev_rolling_score)
        .bind(entry.trend_delta)
        .bind(format_datetime(&entry.last_updated))
        .bind(entry.open_focus_area)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn list_for_rep(&self, rep_id: &str) -> Result<Vec<RepLedgerEntry>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM rep_ledger WHERE rep_id = ?")
            .bind(rep_id)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let mut entries = rows.iter().map(map_row).collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|e| e.skill);
        Ok(entries)
    }
}
