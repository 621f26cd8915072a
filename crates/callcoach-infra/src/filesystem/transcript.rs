//! Transcript blob store on the local filesystem.
//!
//! Each transcript is one JSON file, `{dir}/{encoded call_id}.json`. The call
//! id is percent-encoded, so any id maps to a single file inside `dir` and
//! distinct ids never share a file. Writes go to a temporary file first and
//! are renamed into place, under a store-wide lock.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use callcoach_core::repository::call::TranscriptStore;
use callcoach_types::call::Transcript;
use callcoach_types::error::RepositoryError;

/// `TranscriptStore` backed by JSON files in one directory.
#[derive(Clone)]
pub struct FsTranscriptStore {
    dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FsTranscriptStore {
    /// Store transcripts under `{data_dir}/transcripts/`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join("transcripts"),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn blob_path(&self, call_id: &str) -> Result<PathBuf, RepositoryError> {
        if call_id.is_empty() {
            return Err(RepositoryError::Query(
                "empty call id has no transcript".to_string(),
            ));
        }
        Ok(self.dir.join(blob_file_name(call_id)))
    }
}

/// `{call_id}.json` with everything but `[A-Za-z0-9-_.~]` percent-encoded.
/// Path separators are always encoded, so the name is a single component.
fn blob_file_name(call_id: &str) -> String {
    format!("{}.json", urlencoding::encode(call_id))
}

fn io_error(path: &Path, e: std::io::Error) -> RepositoryError {
    RepositoryError::Query(format!("{}: {e}", path.display()))
}

impl TranscriptStore for FsTranscriptStore {
    async fn read_transcript(&self, call_id: &str) -> Result<Option<Transcript>, RepositoryError> {
        let path = self.blob_path(call_id)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e)),
        };

        let transcript: Transcript = serde_json::from_str(&content).map_err(|e| {
            RepositoryError::Query(format!("invalid transcript {}: {e}", path.display()))
        })?;
        Ok(Some(transcript))
    }

    async fn write_transcript(&self, transcript: &Transcript) -> Result<(), RepositoryError> {
        let path = self.blob_path(&transcript.call_id)?;
        let content = serde_json::to_string_pretty(transcript)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let _guard = self.write_lock.lock().await;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(&path, e))?;

        tracing::debug!(
            call_id = %transcript.call_id,
            segments = transcript.segments.len(),
            "transcript written"
        );
        Ok(())
    }
}
