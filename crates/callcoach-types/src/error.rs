use thiserror::Error;

use crate::llm::ProviderError;

/// Errors from repository operations (used by trait definitions in callcoach-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors turning raw model output into a coaching artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to parse coaching response as JSON")]
    MalformedResponse,

    #[error("invalid coaching artifact: missing scores")]
    MissingScores,
}

/// Errors surfaced by a coaching run or a coaching report query.
///
/// Provider, artifact and storage errors keep their original kind.
#[derive(Debug, Error)]
pub enum CoachError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("no transcript available for call '{0}'")]
    EmptyTranscript(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),

    #[error("coaching run cancelled")]
    Cancelled,
}

impl CoachError {
    pub fn call_not_found(call_id: &str) -> Self {
        CoachError::NotFound {
            entity: "call",
            id: call_id.to_string(),
        }
    }

    pub fn transcript_not_found(call_id: &str) -> Self {
        CoachError::NotFound {
            entity: "transcript",
            id: call_id.to_string(),
        }
    }

    /// Stable machine-readable kind, for JSON error output.
    pub fn kind(&self) -> &'static str {
        match self {
            CoachError::NotFound { .. } => "not_found",
            CoachError::EmptyTranscript(_) => "empty_transcript",
            CoachError::Provider(e) => match e {
                ProviderError::AuthenticationMissing { .. } => "authentication_missing",
                ProviderError::UpstreamRejected { .. } => "upstream_rejected",
                ProviderError::EmptyResponse { .. } => "empty_response",
                ProviderError::Transport { .. } => "transport",
                ProviderError::UnknownModel(_) => "unknown_model",
            },
            CoachError::Artifact(ArtifactError::MalformedResponse) => "malformed_response",
            CoachError::Artifact(ArtifactError::MissingScores) => "missing_scores",
            CoachError::Storage(_) => "storage",
            CoachError::Cancelled => "cancelled",
        }
    }
}
