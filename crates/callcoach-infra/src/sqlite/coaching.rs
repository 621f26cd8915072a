//! SQLite coaching record repository.
//!
//! Artifact fields are stored as JSON text columns. Scores are read leniently
//! so rows written under an older skill set still load.

use sqlx::Row;
use uuid::Uuid;

use callcoach_core::repository::coaching::CoachingRepository;
use callcoach_types::coaching::{CoachingRecord, Evidence, Objection, SkillScores};
use callcoach_types::error::RepositoryError;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed, append-only implementation of `CoachingRepository`.
#[derive(Clone)]
pub struct SqliteCoachingRepository {
    pool: DatabasePool,
}

impl SqliteCoachingRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, sql: &str, key: Option<&str>) -> Result<Vec<CoachingRecord>, RepositoryError> {
        let mut query = sqlx::query(sql);
        if let Some(key) = key {
            query = query.bind(key);
        }
        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|row| CoachingRow::from_row(row).map_err(query_error)?.into_record())
            .collect()
    }
}

struct CoachingRow {
    id: String,
    call_id: String,
    rep_id: String,
    coached_at: String,
    model_id: String,
    scores_json: String,
    strengths_json: String,
    improvements_json: String,
    objections_json: String,
    evidence_json: String,
    summary: String,
    version: String,
}

impl CoachingRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            call_id: row.try_get("call_id")?,
            rep_id: row.try_get("rep_id")?,
            coached_at: row.try_get("coached_at")?,
            model_id: row.try_get("model_id")?,
            scores_json: row.try_get("scores_json")?,
            strengths_json: row.try_get("strengths_json")?,
            improvements_json: row.try_get("improvements_json")?,
            objections_json: row.try_get("objections_json")?,
            evidence_json: row.try_get("evidence_json")?,
            summary: row.try_get("summary")?,
            version: row.try_get("version")?,
        })
    }

    fn into_record(self) -> Result<CoachingRecord, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid coaching id: {e}")))?;
        let scores_value: serde_json::Value = parse_json("scores", &self.scores_json)?;
        let strengths: Vec<String> = parse_json("strengths", &self.strengths_json)?;
        let improvements: Vec<String> = parse_json("improvements", &self.improvements_json)?;
        let objections: Vec<Objection> = parse_json("objections", &self.objections_json)?;
        let evidence: Vec<Evidence> = parse_json("evidence", &self.evidence_json)?;

        Ok(CoachingRecord {
            id,
            call_id: self.call_id,
            rep_id: self.rep_id,
            coached_at: parse_datetime(&self.coached_at)?,
            model_id: self.model_id,
            scores: SkillScores::from_value_lenient(&scores_value),
            strengths,
            improvements,
            objections,
            evidence,
            summary: self.summary,
            version: self.version,
        })
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(column: &str, raw: &str) -> Result<T, RepositoryError> {
    serde_json::from_str(raw)
        .map_err(|e| RepositoryError::Query(format!("invalid {column} JSON: {e}")))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|e| RepositoryError::Query(e.to_string()))
}

impl CoachingRepository for SqliteCoachingRepository {
    async fn append(&self, record: &CoachingRecord) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO coaching_records (id, call_id, rep_id, coached_at, model_id, scores_json, strengths_json, improvements_json, objections_json, evidence_json, summary, version)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.to_string())
        .bind(&record.call_id)
        .bind(&record.rep_id)
        .bind(format_datetime(&record.coached_at))
        .bind(&record.model_id)
        .bind(to_json(&record.scores)?)
        .bind(to_json(&record.strengths)?)
        .bind(to_json(&record.improvements)?)
        .bind(to_json(&record.objections)?)
        .bind(to_json(&record.evidence)?)
        .bind(&record.summary)
        .bind(&record.version)
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("coaching record '{}' already exists", record.id)),
            ),
            Err(e) => Err(query_error(e)),
        }
    }

    async fn list_for_rep(&self, rep_id: &str) -> Result<Vec<CoachingRecord>, RepositoryError> {
        self.fetch(
            "SELECT * FROM coaching_records WHERE rep_id = ? ORDER BY coached_at DESC",
            Some(rep_id),
        )
        .await
    }

    async fn list_for_call(&self, call_id: &str) -> Result<Vec<CoachingRecord>, RepositoryError> {
        self.fetch(
            "SELECT * FROM coaching_records WHERE call_id = ? ORDER BY coached_at DESC",
            Some(call_id),
        )
        .await
    }

    async fn list_all(&self) -> Result<Vec<CoachingRecord>, RepositoryError> {
        self.fetch("SELECT * FROM coaching_records ORDER BY coached_at DESC", None)
            .await
    }
}
