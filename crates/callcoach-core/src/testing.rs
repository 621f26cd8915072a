//! In-memory repositories and scripted providers for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;

use callcoach_types::call::{CallRecord, Transcript, TranscriptSegment};
use callcoach_types::coaching::{CoachingArtifact, CoachingRecord, SkillScores};
use callcoach_types::error::RepositoryError;
use callcoach_types::ledger::RepLedgerEntry;
use callcoach_types::llm::{ProviderError, ProviderName};
use callcoach_types::skill::Skill;

use crate::llm::box_provider::BoxCompletionProvider;
use crate::llm::provider::{CompletionProvider, ProviderFactory};
use crate::repository::call::{CallRepository, TranscriptStore};
use crate::repository::coaching::CoachingRepository;
use crate::repository::ledger::LedgerRepository;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn call(call_id: &str, rep_id: &str) -> CallRecord {
    CallRecord {
        call_id: call_id.to_string(),
        title: format!("Call {call_id}"),
        rep_id: rep_id.to_string(),
        rep_name: format!("Rep {rep_id}"),
        start_time: Utc::now(),
        duration_sec: 1800,
        source_url: None,
        synced_at: Utc::now(),
    }
}

pub fn segment(speaker: &str, text: &str, start_time: f64) -> TranscriptSegment {
    TranscriptSegment {
        speaker: speaker.to_string(),
        text: text.to_string(),
        start_time,
        end_time: start_time + 5.0,
    }
}

pub fn artifact_with(scores: SkillScores) -> CoachingArtifact {
    CoachingArtifact {
        scores,
        strengths: vec!["Clear agenda".to_string()],
        improvements: vec!["Ask about budget".to_string()],
        objections: Vec::new(),
        evidence: Vec::new(),
        summary: "Solid call.".to_string(),
    }
}

pub fn record_at(
    rep_id: &str,
    call_id: &str,
    coached_at: DateTime<Utc>,
    scores: SkillScores,
) -> CoachingRecord {
    CoachingRecord::new(
        &call(call_id, rep_id),
        artifact_with(scores),
        "claude-sonnet-4-20250514",
        coached_at,
    )
}

/// Model reply containing all eight skills at `score`.
pub fn artifact_json(score: u8) -> String {
    let scores: serde_json::Map<String, serde_json::Value> = Skill::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), serde_json::Value::from(score)))
        .collect();
    serde_json::json!({
        "scores": scores,
        "strengths": ["Opened with an agenda"],
        "improvements": ["Confirm next steps"],
        "objections": [{"objection": "Too expensive", "handling": "Reframed on ROI"}],
        "evidence": [{"timestamp": 12.0, "quote": "Let's start", "skill": "Discovery", "assessment": "good"}],
        "summary": "Productive discovery call."
    })
    .to_string()
}

// ---------------------------------------------------------------------------
// InMemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreState {
    calls: HashMap<String, CallRecord>,
    transcripts: HashMap<String, Transcript>,
    records: Vec<CoachingRecord>,
    ledger: HashMap<(String, Skill), RepLedgerEntry>,
    ledger_upserts: usize,
    fail_appends: bool,
    fail_transcript_writes: bool,
    ledger_gate: Option<Arc<Semaphore>>,
}

/// Shared in-memory implementation of every repository trait.
///
/// Clones share state, so one store can back all four ports of a service.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    fn with_state<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let mut guard = self.state.lock().unwrap();
        f(&mut guard)
    }

    pub fn insert_call(&self, call: CallRecord) {
        self.with_state(|s| s.calls.insert(call.call_id.clone(), call));
    }

    pub fn insert_transcript(&self, call_id: &str, segments: Vec<TranscriptSegment>) {
        self.with_state(|s| {
            s.transcripts.insert(
                call_id.to_string(),
                Transcript {
                    call_id: call_id.to_string(),
                    segments,
                },
            )
        });
    }

    pub fn push_record(&self, record: CoachingRecord) {
        self.with_state(|s| s.records.push(record));
    }

    pub fn records(&self) -> Vec<CoachingRecord> {
        self.with_state(|s| s.records.clone())
    }

    pub fn ledger_entry(&self, rep_id: &str, skill: Skill) -> Option<RepLedgerEntry> {
        self.with_state(|s| s.ledger.get(&(rep_id.to_string(), skill)).cloned())
    }

    pub fn ledger_upserts(&self) -> usize {
        self.with_state(|s| s.ledger_upserts)
    }

    pub fn fail_appends(&self) {
        self.with_state(|s| s.fail_appends = true);
    }

    pub fn fail_transcript_writes(&self) {
        self.with_state(|s| s.fail_transcript_writes = true);
    }

    /// Make every ledger upsert wait for a permit on the returned semaphore.
    pub fn hold_ledger_writes(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.with_state(|s| s.ledger_gate = Some(Arc::clone(&gate)));
        gate
    }
}

impl CallRepository for InMemoryStore {
    async fn get_call(&self, call_id: &str) -> Result<Option<CallRecord>, RepositoryError> {
        Ok(self.with_state(|s| s.calls.get(call_id).cloned()))
    }

    async fn list_calls(&self) -> Result<Vec<CallRecord>, RepositoryError> {
        Ok(self.with_state(|s| s.calls.values().cloned().collect()))
    }

    async fn upsert_call(&self, call: &CallRecord) -> Result<(), RepositoryError> {
        self.insert_call(call.clone());
        Ok(())
    }
}

impl TranscriptStore for InMemoryStore {
    async fn read_transcript(&self, call_id: &str) -> Result<Option<Transcript>, RepositoryError> {
        Ok(self.with_state(|s| s.transcripts.get(call_id).cloned()))
    }

    async fn write_transcript(&self, transcript: &Transcript) -> Result<(), RepositoryError> {
        self.with_state(|s| {
            if s.fail_transcript_writes {
                return Err(RepositoryError::Query("read-only volume".to_string()));
            }
            s.transcripts
                .insert(transcript.call_id.clone(), transcript.clone());
            Ok(())
        })
    }
}

impl CoachingRepository for InMemoryStore {
    async fn append(&self, record: &CoachingRecord) -> Result<(), RepositoryError> {
        self.with_state(|s| {
            if s.fail_appends {
                return Err(RepositoryError::Query("disk full".to_string()));
            }
            s.records.push(record.clone());
            Ok(())
        })
    }

    async fn list_for_rep(&self, rep_id: &str) -> Result<Vec<CoachingRecord>, RepositoryError> {
        Ok(self.with_state(|s| {
            s.records
                .iter()
                .filter(|r| r.rep_id == rep_id)
                .cloned()
                .collect()
        }))
    }

    async fn list_for_call(&self, call_id: &str) -> Result<Vec<CoachingRecord>, RepositoryError> {
        Ok(self.with_state(|s| {
            s.records
                .iter()
                .filter(|r| r.call_id == call_id)
                .cloned()
                .collect()
        }))
    }

    async fn list_all(&self) -> Result<Vec<CoachingRecord>, RepositoryError> {
        Ok(self.records())
    }
}

impl LedgerRepository for InMemoryStore {
    async fn get(&self, rep_id: &str, skill: Skill) -> Result<Option<RepLedgerEntry>, RepositoryError> {
        Ok(self.ledger_entry(rep_id, skill))
    }

    async fn upsert(&self, entry: &RepLedgerEntry) -> Result<(), RepositoryError> {
        let gate = self.with_state(|s| s.ledger_gate.clone());
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
        self.with_state(|s| {
            s.ledger
                .insert((entry.rep_id.clone(), entry.skill), entry.clone());
            s.ledger_upserts += 1;
        });
        Ok(())
    }

    async fn list_for_rep(&self, rep_id: &str) -> Result<Vec<RepLedgerEntry>, RepositoryError> {
        Ok(self.with_state(|s| {
            Skill::ALL
                .iter()
                .filter_map(|skill| s.ledger.get(&(rep_id.to_string(), *skill)).cloned())
                .collect()
        }))
    }
}

// ---------------------------------------------------------------------------
// Scripted providers
// ---------------------------------------------------------------------------

/// What a mock provider answers with.
#[derive(Clone)]
pub enum MockReply {
    Text(String),
    Rejected(u16, String),
    Empty,
    /// Never resolves; used to exercise cancellation.
    Pending,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub provider: ProviderName,
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
}

struct FactoryState {
    reply: MockReply,
    has_credentials: bool,
    created: AtomicUsize,
    calls: Mutex<Vec<RecordedCall>>,
}

/// Provider factory that hands out scripted providers and records traffic.
#[derive(Clone)]
pub struct MockFactory {
    state: Arc<FactoryState>,
}

impl MockFactory {
    pub fn replying(reply: MockReply) -> Self {
        Self {
            state: Arc::new(FactoryState {
                reply,
                has_credentials: true,
                created: AtomicUsize::new(0),
                calls: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn without_credentials() -> Self {
        Self {
            state: Arc::new(FactoryState {
                reply: MockReply::Empty,
                has_credentials: false,
                created: AtomicUsize::new(0),
                calls: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn created(&self) -> usize {
        self.state.created.load(Ordering::SeqCst)
    }
}

impl ProviderFactory for MockFactory {
    fn create(&self, provider: ProviderName) -> Result<BoxCompletionProvider, ProviderError> {
        if !self.state.has_credentials {
            return Err(ProviderError::AuthenticationMissing {
                provider,
                env_var: "TEST_API_KEY".to_string(),
            });
        }
        self.state.created.fetch_add(1, Ordering::SeqCst);
        Ok(BoxCompletionProvider::new(MockProvider {
            name: provider,
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockProvider {
    name: ProviderName,
    state: Arc<FactoryState>,
}

impl CompletionProvider for MockProvider {
    fn name(&self) -> ProviderName {
        self.name
    }

    async fn generate_completion(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
    ) -> Result<String, ProviderError> {
        self.state.calls.lock().unwrap().push(RecordedCall {
            provider: self.name,
            model: model.to_string(),
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
        });
        match self.state.reply.clone() {
            MockReply::Text(text) => Ok(text),
            MockReply::Rejected(status, body) => Err(ProviderError::UpstreamRejected {
                provider: self.name,
                status,
                body,
            }),
            MockReply::Empty => Err(ProviderError::EmptyResponse {
                provider: self.name,
            }),
            MockReply::Pending => std::future::pending().await,
        }
    }
}
