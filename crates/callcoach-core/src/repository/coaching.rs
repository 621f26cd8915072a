//! Coaching record repository trait.

use callcoach_types::coaching::CoachingRecord;
use callcoach_types::error::RepositoryError;

/// Append-only store of coaching records.
pub trait CoachingRepository: Send + Sync {
    /// Add a record. Never replaces an earlier record for the same call.
    fn append(
        &self,
        record: &CoachingRecord,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// All records for a rep, in no particular order.
    fn list_for_rep(
        &self,
        rep_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<CoachingRecord>, RepositoryError>> + Send;

    /// All records for a call, in no particular order.
    fn list_for_call(
        &self,
        call_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<CoachingRecord>, RepositoryError>> + Send;

    /// Every record.
    fn list_all(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<CoachingRecord>, RepositoryError>> + Send;
}
