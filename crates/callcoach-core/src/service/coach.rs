//! Coaching orchestrator.
//!
//! One run: load call and transcript, format, build prompts, ask the model,
//! repair the reply into an artifact, append the record, then recompute the
//! rep's trend ledger. Provider and artifact errors propagate unchanged.
//!
//! The append and the ledger update run as one spawned task. Abandoning a
//! run, by cancelling its token or by dropping its future, never leaves a
//! persisted record without its ledger update.

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info};

use callcoach_types::coaching::CoachingRecord;
use callcoach_types::error::CoachError;
use callcoach_types::ledger::RepLedgerEntry;

use crate::artifact::parse_artifact;
use crate::ledger::TrendLedgerUpdater;
use crate::llm::gateway::ProviderGateway;
use crate::llm::provider::ProviderFactory;
use crate::prompt::build_prompts;
use crate::repository::call::{CallRepository, TranscriptStore};
use crate::repository::coaching::CoachingRepository;
use crate::repository::ledger::LedgerRepository;
use crate::transcript::format_transcript;

/// Result of a successful coaching run.
#[derive(Debug, Clone)]
pub struct CoachingOutcome {
    pub record: CoachingRecord,
    /// Ledger entries written for the rep, in skill order.
    pub ledger_entries: Vec<RepLedgerEntry>,
}

/// Runs the coaching pipeline for a call.
pub struct CoachingService<C, T, R, L, F>
where
    C: CallRepository,
    T: TranscriptStore,
    R: CoachingRepository + Clone + 'static,
    L: LedgerRepository + 'static,
    F: ProviderFactory,
{
    calls: C,
    transcripts: T,
    coaching: R,
    gateway: ProviderGateway<F>,
    ledger: Arc<TrendLedgerUpdater<R, L>>,
    default_model: String,
}

impl<C, T, R, L, F> CoachingService<C, T, R, L, F>
where
    C: CallRepository,
    T: TranscriptStore,
    R: CoachingRepository + Clone + 'static,
    L: LedgerRepository + 'static,
    F: ProviderFactory,
{
    /// Create a new CoachingService.
    ///
    /// `default_model` is used whenever a run does not name a model.
    pub fn new(
        calls: C,
        transcripts: T,
        coaching: R,
        ledger: L,
        factory: F,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            calls,
            transcripts,
            ledger: Arc::new(TrendLedgerUpdater::new(coaching.clone(), ledger)),
            coaching,
            gateway: ProviderGateway::new(factory),
            default_model: default_model.into(),
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Coach a call to completion.
    pub async fn run(
        &self,
        call_id: &str,
        model_id: Option<&str>,
    ) -> Result<CoachingOutcome, CoachError> {
        self.run_with_cancel(call_id, model_id, &CancellationToken::new())
            .await
    }

    /// Coach a call, abandoning the run if `cancel` fires first.
    ///
    /// Cancellation is observed until the record append begins. From then on
    /// the append and the ledger update run in a spawned task that finishes
    /// even if the token fires or this future is dropped.
    #[tracing::instrument(name = "coach_call", skip(self, cancel), fields(call_id = %call_id))]
    pub async fn run_with_cancel(
        &self,
        call_id: &str,
        model_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<CoachingOutcome, CoachError> {
        let model_id = model_id.unwrap_or(&self.default_model);

        let call = self
            .calls
            .get_call(call_id)
            .await?
            .ok_or_else(|| CoachError::call_not_found(call_id))?;
        let transcript = self
            .transcripts
            .read_transcript(call_id)
            .await?
            .ok_or_else(|| CoachError::transcript_not_found(call_id))?;
        if transcript.is_empty() {
            return Err(CoachError::EmptyTranscript(call_id.to_string()));
        }

        let formatted = format_transcript(&transcript.segments);
        let prompts = build_prompts(&formatted, &call.metadata());
        debug!(
            segments = transcript.segments.len(),
            model = %model_id,
            "prompts built"
        );

        let raw = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("coaching run cancelled while waiting on provider");
                return Err(CoachError::Cancelled);
            }
            reply = self.gateway.generate(prompts.system, &prompts.user, model_id) => reply?,
        };

        let artifact = parse_artifact(&raw)?;

        if cancel.is_cancelled() {
            info!("coaching run cancelled before persisting");
            return Err(CoachError::Cancelled);
        }

        let record = CoachingRecord::new(&call, artifact, model_id, Utc::now());
        let persist = tokio::spawn(
            persist_record(self.coaching.clone(), Arc::clone(&self.ledger), record)
                .in_current_span(),
        );
        match persist.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            // Only reachable when the runtime shuts down under the task.
            Err(_) => Err(CoachError::Cancelled),
        }
    }
}

async fn persist_record<R, L>(
    coaching: R,
    ledger: Arc<TrendLedgerUpdater<R, L>>,
    record: CoachingRecord,
) -> Result<CoachingOutcome, CoachError>
where
    R: CoachingRepository,
    L: LedgerRepository,
{
    coaching.append(&record).await?;
    info!(record_id = %record.id, rep_id = %record.rep_id, "coaching record appended");

    let ledger_entries = ledger.update(&record.rep_id, &record.scores).await?;

    Ok(CoachingOutcome {
        record,
        ledger_entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryStore, MockFactory, MockReply, artifact_json, call, segment};
    use callcoach_types::error::ArtifactError;
    use callcoach_types::llm::{DEFAULT_MODEL_ID, ProviderError, ProviderName};
    use callcoach_types::skill::Skill;

    type TestService =
        CoachingService<InMemoryStore, InMemoryStore, InMemoryStore, InMemoryStore, MockFactory>;

    fn service(store: &InMemoryStore, factory: &MockFactory) -> TestService {
        CoachingService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            factory.clone(),
            DEFAULT_MODEL_ID,
        )
    }

    fn seeded_store() -> InMemoryStore {
        let store = InMemoryStore::default();
        store.insert_call(call("call-1", "rep-1"));
        store.insert_transcript(
            "call-1",
            vec![
                segment("Alex", "Thanks for joining today.", 0.0),
                segment("Jordan", "Happy to be here.", 65.4),
            ],
        );
        store
    }

    #[tokio::test]
    async fn test_end_to_end_persists_record_and_updates_all_skills() {
        let store = seeded_store();
        let factory = MockFactory::replying(MockReply::Text(artifact_json(4)));

        let outcome = service(&store, &factory).run("call-1", None).await.unwrap();

        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].call_id, "call-1");
        assert_eq!(records[0].rep_id, "rep-1");
        assert_eq!(records[0].model_id, DEFAULT_MODEL_ID);
        assert_eq!(records[0].version, "1.0");
        for skill in Skill::ALL {
            assert_eq!(records[0].scores.get(skill), Some(4));
        }

        assert_eq!(outcome.ledger_entries.len(), 8);
        assert_eq!(store.ledger_upserts(), 8);
        for skill in Skill::ALL {
            let entry = store.ledger_entry("rep-1", skill).unwrap();
            assert_eq!(entry.rolling_score, 4.0);
            assert_eq!(entry.trend_delta, 0.0);
        }
    }

    #[tokio::test]
    async fn test_prompt_carries_formatted_transcript_and_metadata() {
        let store = seeded_store();
        let factory = MockFactory::replying(MockReply::Text(artifact_json(3)));

        service(&store, &factory).run("call-1", Some("gpt-4o")).await.unwrap();

        let calls = factory.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].provider, ProviderName::OpenAi);
        assert_eq!(calls[0].model, "gpt-4o");
        assert!(calls[0].user_prompt.contains("[0:00] Alex: Thanks for joining today."));
        assert!(calls[0].user_prompt.contains("[1:05] Jordan: Happy to be here."));
        assert!(calls[0].user_prompt.contains("Rep rep-1"));
        assert!(calls[0].system_prompt.contains("Competitive Positioning"));
    }

    #[tokio::test]
    async fn test_reruns_append_new_records() {
        let store = seeded_store();
        let factory = MockFactory::replying(MockReply::Text(artifact_json(2)));
        let svc = service(&store, &factory);

        svc.run("call-1", None).await.unwrap();
        let second = svc.run("call-1", None).await.unwrap();

        assert_eq!(store.records().len(), 2);
        assert_eq!(second.ledger_entries.len(), 8);
        assert!(second.ledger_entries.iter().all(|e| e.open_focus_area));
    }

    #[tokio::test]
    async fn test_missing_call_is_not_found() {
        let store = InMemoryStore::default();
        let factory = MockFactory::replying(MockReply::Text(artifact_json(4)));

        let err = service(&store, &factory).run("nope", None).await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
        assert!(factory.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_transcript_is_not_found() {
        let store = InMemoryStore::default();
        store.insert_call(call("call-2", "rep-1"));
        let factory = MockFactory::replying(MockReply::Text(artifact_json(4)));

        let err = service(&store, &factory).run("call-2", None).await.unwrap_err();
        assert!(matches!(err, CoachError::NotFound { entity: "transcript", .. }));
    }

    #[tokio::test]
    async fn test_empty_transcript_is_rejected() {
        let store = InMemoryStore::default();
        store.insert_call(call("call-3", "rep-1"));
        store.insert_transcript("call-3", Vec::new());
        let factory = MockFactory::replying(MockReply::Text(artifact_json(4)));

        let err = service(&store, &factory).run("call-3", None).await.unwrap_err();
        assert!(matches!(err, CoachError::EmptyTranscript(ref id) if id == "call-3"));
        assert!(factory.calls().is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_kind_propagates_without_persisting() {
        let store = seeded_store();
        let factory = MockFactory::replying(MockReply::Rejected(401, "bad key".into()));

        let err = service(&store, &factory).run("call-1", None).await.unwrap_err();
        assert!(matches!(
            err,
            CoachError::Provider(ProviderError::UpstreamRejected { status: 401, .. })
        ));
        assert!(store.records().is_empty());
        assert_eq!(store.ledger_upserts(), 0);
    }

    #[tokio::test]
    async fn test_malformed_reply_propagates() {
        let store = seeded_store();
        let factory = MockFactory::replying(MockReply::Text("I could not score this.".into()));

        let err = service(&store, &factory).run("call-1", None).await.unwrap_err();
        assert!(matches!(err, CoachError::Artifact(ArtifactError::MalformedResponse)));
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_model_fails_closed() {
        let store = seeded_store();
        let factory = MockFactory::replying(MockReply::Text(artifact_json(4)));

        let err = service(&store, &factory)
            .run("call-1", Some("mystery-model"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "unknown_model");
        assert_eq!(factory.created(), 0);
    }

    #[tokio::test]
    async fn test_cancel_during_provider_call_persists_nothing() {
        let store = seeded_store();
        let factory = MockFactory::replying(MockReply::Pending);
        let svc = service(&store, &factory);
        let token = CancellationToken::new();

        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                token.cancel();
            })
        };

        let err = svc
            .run_with_cancel("call-1", None, &token)
            .await
            .unwrap_err();
        canceller.await.unwrap();

        assert!(matches!(err, CoachError::Cancelled));
        assert!(store.records().is_empty());
        assert_eq!(store.ledger_upserts(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_skips_ledger() {
        let store = seeded_store();
        store.fail_appends();
        let factory = MockFactory::replying(MockReply::Text(artifact_json(4)));

        let err = service(&store, &factory).run("call-1", None).await.unwrap_err();
        assert_eq!(err.kind(), "storage");
        assert_eq!(store.ledger_upserts(), 0);
    }

    #[tokio::test]
    async fn test_dropped_run_still_updates_ledger_after_append() {
        let store = seeded_store();
        let gate = store.hold_ledger_writes();
        let factory = MockFactory::replying(MockReply::Text(artifact_json(4)));
        let svc = service(&store, &factory);

        // The run parks on the first ledger upsert, after the append.
        let abandoned =
            tokio::time::timeout(std::time::Duration::from_millis(50), svc.run("call-1", None))
                .await;
        assert!(abandoned.is_err());
        assert_eq!(store.records().len(), 1);
        assert_eq!(store.ledger_upserts(), 0);

        gate.add_permits(Skill::ALL.len());
        for _ in 0..100 {
            if store.ledger_upserts() == Skill::ALL.len() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        assert_eq!(store.ledger_upserts(), Skill::ALL.len());
        let closing = store.ledger_entry("rep-1", Skill::Closing).unwrap();
        assert_eq!(closing.rolling_score, 4.0);
    }

    #[tokio::test]
    async fn test_cancel_after_append_still_updates_ledger() {
        let store = seeded_store();
        let gate = store.hold_ledger_writes();
        let factory = MockFactory::replying(MockReply::Text(artifact_json(3)));
        let svc = service(&store, &factory);
        let token = CancellationToken::new();

        let releaser = {
            let token = token.clone();
            let store = store.clone();
            tokio::spawn(async move {
                while store.records().is_empty() {
                    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
                }
                token.cancel();
                gate.add_permits(Skill::ALL.len());
            })
        };

        let outcome = svc.run_with_cancel("call-1", None, &token).await.unwrap();
        releaser.await.unwrap();

        assert_eq!(outcome.ledger_entries.len(), Skill::ALL.len());
        assert_eq!(store.ledger_upserts(), Skill::ALL.len());
    }
}
