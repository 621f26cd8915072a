//! SQLite storage backend.
//!
//! All writes go through the single-connection writer pool, so writes to
//! every table are serialized. Reads use the multi-connection reader pool.

pub mod call;
pub mod coaching;
pub mod ledger;
pub mod pool;

use chrono::{DateTime, Utc};

use callcoach_types::error::RepositoryError;

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

pub(crate) fn query_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}
