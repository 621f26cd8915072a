//! Call metadata and transcript storage traits.

use callcoach_types::call::{CallRecord, Transcript};
use callcoach_types::error::RepositoryError;

/// Repository trait for call metadata rows.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait CallRepository: Send + Sync {
    /// Get a call by id.
    fn get_call(
        &self,
        call_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<CallRecord>, RepositoryError>> + Send;

    /// List every call.
    fn list_calls(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<CallRecord>, RepositoryError>> + Send;

    /// Insert or fully replace the call keyed by `call_id`.
    fn upsert_call(
        &self,
        call: &CallRecord,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

/// Blob storage for call transcripts.
pub trait TranscriptStore: Send + Sync {
    /// Read a transcript. Returns `None` when no blob exists for the call.
    fn read_transcript(
        &self,
        call_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Transcript>, RepositoryError>> + Send;

    /// Write (or overwrite) the transcript blob for `transcript.call_id`.
    fn write_transcript(
        &self,
        transcript: &Transcript,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
