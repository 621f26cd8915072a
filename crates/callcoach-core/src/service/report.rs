//! Read-side views over calls, coaching records and the trend ledger, plus
//! call import.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::info;

use callcoach_types::call::{CallImport, CallRecord, Transcript};
use callcoach_types::coaching::CoachingRecord;
use callcoach_types::error::CoachError;
use callcoach_types::report::{CallDetail, CallSummary, RecentCoaching, RepDetail, RepSummary};

use crate::ledger::select_window;
use crate::repository::call::{CallRepository, TranscriptStore};
use crate::repository::coaching::CoachingRepository;
use crate::repository::ledger::LedgerRepository;

/// Title shown for a coaching record whose call row is gone.
pub const UNKNOWN_CALL_TITLE: &str = "Unknown Call";

/// Newest first; ties broken by record id.
fn newest_first(a: &CoachingRecord, b: &CoachingRecord) -> Ordering {
    b.coached_at
        .cmp(&a.coached_at)
        .then_with(|| b.id.cmp(&a.id))
}

pub struct ReportService<C, T, R, L>
where
    C: CallRepository,
    T: TranscriptStore,
    R: CoachingRepository,
    L: LedgerRepository,
{
    calls: C,
    transcripts: T,
    coaching: R,
    ledger: L,
}

impl<C, T, R, L> ReportService<C, T, R, L>
where
    C: CallRepository,
    T: TranscriptStore,
    R: CoachingRepository,
    L: LedgerRepository,
{
    pub fn new(calls: C, transcripts: T, coaching: R, ledger: L) -> Self {
        Self {
            calls,
            transcripts,
            coaching,
            ledger,
        }
    }

    /// Overwrite a call's transcript blob, then upsert its call row.
    ///
    /// The blob goes first: a failed import leaves no call row pointing at a
    /// transcript that was never written.
    #[tracing::instrument(name = "import_call", skip(self, import), fields(call_id = %import.call.call_id))]
    pub async fn import_call(&self, import: CallImport) -> Result<CallRecord, CoachError> {
        let CallImport { call, segments } = import;
        let segment_count = segments.len();
        self.transcripts
            .write_transcript(&Transcript {
                call_id: call.call_id.clone(),
                segments,
            })
            .await?;
        self.calls.upsert_call(&call).await?;
        info!(segments = segment_count, "call imported");
        Ok(call)
    }

    /// All calls, most recent start first, flagged when coached at least once.
    pub async fn list_calls(&self) -> Result<Vec<CallSummary>, CoachError> {
        let coached: HashSet<String> = self
            .coaching
            .list_all()
            .await?
            .into_iter()
            .map(|r| r.call_id)
            .collect();

        let mut calls = self.calls.list_calls().await?;
        calls.sort_by(|a, b| {
            b.start_time
                .cmp(&a.start_time)
                .then_with(|| a.call_id.cmp(&b.call_id))
        });

        Ok(calls
            .into_iter()
            .map(|call| CallSummary {
                coached: coached.contains(&call.call_id),
                call,
            })
            .collect())
    }

    /// Metadata, transcript and latest coaching artifact for a call.
    ///
    /// A missing transcript blob shows as an empty transcript.
    pub async fn call_detail(&self, call_id: &str) -> Result<CallDetail, CoachError> {
        let call = self
            .calls
            .get_call(call_id)
            .await?
            .ok_or_else(|| CoachError::call_not_found(call_id))?;
        let transcript = self
            .transcripts
            .read_transcript(call_id)
            .await?
            .map(|t| t.segments)
            .unwrap_or_default();
        let coaching = self
            .history(call_id)
            .await?
            .first()
            .map(CoachingRecord::artifact);

        Ok(CallDetail {
            call,
            transcript,
            coaching,
        })
    }

    /// Every coaching record for a call, newest first.
    pub async fn history(&self, call_id: &str) -> Result<Vec<CoachingRecord>, CoachError> {
        let mut records = self.coaching.list_for_call(call_id).await?;
        records.sort_by(newest_first);
        Ok(records)
    }

    /// One row per rep that has calls, ordered by rep name.
    ///
    /// `avg_score` is the mean of each coaching record's own mean score, so
    /// every record weighs the same regardless of how many skills it scored.
    pub async fn rep_summaries(&self) -> Result<Vec<RepSummary>, CoachError> {
        let mut reps: BTreeMap<String, RepSummary> = BTreeMap::new();
        for call in self.calls.list_calls().await? {
            reps.entry(call.rep_id.clone())
                .and_modify(|r| r.call_count += 1)
                .or_insert_with(|| RepSummary {
                    rep_id: call.rep_id.clone(),
                    rep_name: call.rep_name.clone(),
                    call_count: 1,
                    avg_score: None,
                });
        }

        let mut record_means: HashMap<String, Vec<f64>> = HashMap::new();
        for record in self.coaching.list_all().await? {
            if let Some(mean) = record.scores.mean() {
                record_means.entry(record.rep_id).or_default().push(mean);
            }
        }

        let mut summaries: Vec<RepSummary> = reps
            .into_values()
            .map(|mut rep| {
                rep.avg_score = record_means
                    .get(&rep.rep_id)
                    .map(|means| means.iter().sum::<f64>() / means.len() as f64);
                rep
            })
            .collect();
        summaries.sort_by(|a, b| {
            a.rep_name
                .cmp(&b.rep_name)
                .then_with(|| a.rep_id.cmp(&b.rep_id))
        });
        Ok(summaries)
    }

    /// Ledger trends and the most recent coaching for a rep.
    ///
    /// A rep is known only through its calls; a rep with none is not found.
    /// The rep's display name is taken from the first call the call
    /// repository lists for them, which for SQLite is the latest by start time.
    pub async fn rep_detail(&self, rep_id: &str) -> Result<RepDetail, CoachError> {
        let rep_calls: Vec<CallRecord> = self
            .calls
            .list_calls()
            .await?
            .into_iter()
            .filter(|c| c.rep_id == rep_id)
            .collect();
        let Some(first) = rep_calls.first() else {
            return Err(CoachError::NotFound {
                entity: "rep",
                id: rep_id.to_string(),
            });
        };
        let rep_name = first.rep_name.clone();

        let trends = self.ledger.list_for_rep(rep_id).await?;
        let window = select_window(self.coaching.list_for_rep(rep_id).await?);

        let titles: HashMap<&str, &str> = rep_calls
            .iter()
            .map(|c| (c.call_id.as_str(), c.title.as_str()))
            .collect();
        let recent_coaching = window
            .into_iter()
            .map(|record| RecentCoaching {
                call_title: titles
                    .get(record.call_id.as_str())
                    .copied()
                    .unwrap_or(UNKNOWN_CALL_TITLE)
                    .to_string(),
                call_id: record.call_id,
                coached_at: record.coached_at,
                summary: record.summary,
                scores: record.scores,
            })
            .collect();

        Ok(RepDetail {
            rep_id: rep_id.to_string(),
            rep_name,
            trends,
            recent_coaching,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryStore, call, record_at, segment};
    use callcoach_types::coaching::SkillScores;
    use callcoach_types::ledger::ROLLING_WINDOW;
    use callcoach_types::skill::Skill;
    use chrono::{Duration, Utc};

    type TestService = ReportService<InMemoryStore, InMemoryStore, InMemoryStore, InMemoryStore>;

    fn service(store: &InMemoryStore) -> TestService {
        ReportService::new(store.clone(), store.clone(), store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_import_then_detail_round_trips() {
        let store = InMemoryStore::default();
        let svc = service(&store);
        let import = CallImport {
            call: call("c-1", "rep-1"),
            segments: vec![segment("Alex", "Hello", 0.0), segment("Sam", "Hi", 2.0)],
        };

        svc.import_call(import).await.unwrap();
        let detail = svc.call_detail("c-1").await.unwrap();

        assert_eq!(detail.call.call_id, "c-1");
        assert_eq!(detail.transcript.len(), 2);
        assert!(detail.coaching.is_none());
    }

    #[tokio::test]
    async fn test_failed_transcript_write_leaves_no_call_row() {
        let store = InMemoryStore::default();
        store.fail_transcript_writes();
        let svc = service(&store);

        let err = svc
            .import_call(CallImport {
                call: call("c-1", "rep-1"),
                segments: vec![segment("Alex", "Hello", 0.0)],
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "storage");
        assert!(svc.list_calls().await.unwrap().is_empty());
        match svc.call_detail("c-1").await {
            Err(CoachError::NotFound { entity, .. }) => assert_eq!(entity, "call"),
            other => panic!("Expected NotFound, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_call_detail_shows_latest_coaching() {
        let store = InMemoryStore::default();
        store.insert_call(call("c-1", "rep-1"));
        let earlier = Utc::now() - Duration::hours(3);
        store.push_record(record_at("rep-1", "c-1", Utc::now(), SkillScores::uniform(5)));
        store.push_record(record_at("rep-1", "c-1", earlier, SkillScores::uniform(2)));

        let detail = service(&store).call_detail("c-1").await.unwrap();

        assert!(detail.transcript.is_empty());
        let coaching = detail.coaching.unwrap();
        assert_eq!(coaching.scores.get(Skill::Closing), Some(5));
    }

    #[tokio::test]
    async fn test_call_detail_unknown_call() {
        let store = InMemoryStore::default();
        let err = service(&store).call_detail("missing").await.unwrap_err();
        assert_eq!(err.to_string(), "call 'missing' not found");
    }

    #[tokio::test]
    async fn test_list_calls_sorted_and_flagged() {
        let store = InMemoryStore::default();
        let mut old = call("c-old", "rep-1");
        old.start_time = Utc::now() - Duration::days(2);
        store.insert_call(old);
        store.insert_call(call("c-new", "rep-1"));
        store.push_record(record_at("rep-1", "c-old", Utc::now(), SkillScores::uniform(3)));

        let calls = service(&store).list_calls().await.unwrap();

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].call.call_id, "c-new");
        assert!(!calls[0].coached);
        assert_eq!(calls[1].call.call_id, "c-old");
        assert!(calls[1].coached);
    }

    #[tokio::test]
    async fn test_rep_summaries_average_record_means() {
        let store = InMemoryStore::default();
        store.insert_call(call("c-1", "rep-a"));
        store.insert_call(call("c-2", "rep-a"));
        store.insert_call(call("c-3", "rep-b"));
        store.push_record(record_at("rep-a", "c-1", Utc::now(), SkillScores::uniform(4)));
        let partial: SkillScores = [(Skill::Closing, 1), (Skill::Discovery, 3)]
            .into_iter()
            .collect();
        store.push_record(record_at("rep-a", "c-2", Utc::now(), partial));

        let reps = service(&store).rep_summaries().await.unwrap();

        assert_eq!(reps.len(), 2);
        assert_eq!(reps[0].rep_id, "rep-a");
        assert_eq!(reps[0].call_count, 2);
        assert_eq!(reps[0].avg_score, Some(3.0));
        assert_eq!(reps[1].rep_id, "rep-b");
        assert_eq!(reps[1].avg_score, None);
    }

    #[tokio::test]
    async fn test_rep_detail_recent_coaching_window() {
        let store = InMemoryStore::default();
        store.insert_call(call("c-1", "rep-1"));
        let base = Utc::now() - Duration::days(20);
        for i in 0..12 {
            store.push_record(record_at(
                "rep-1",
                if i == 11 { "c-gone" } else { "c-1" },
                base + Duration::days(i),
                SkillScores::uniform(3),
            ));
        }

        let detail = service(&store).rep_detail("rep-1").await.unwrap();

        assert_eq!(detail.rep_name, "Rep rep-1");
        assert_eq!(detail.recent_coaching.len(), ROLLING_WINDOW);
        assert_eq!(detail.recent_coaching[0].call_title, UNKNOWN_CALL_TITLE);
        assert_eq!(detail.recent_coaching[1].call_title, "Call c-1");
        assert!(detail.trends.is_empty());
    }

    #[tokio::test]
    async fn test_rep_detail_unknown_rep() {
        let store = InMemoryStore::default();
        let err = service(&store).rep_detail("ghost").await.unwrap_err();
        assert!(matches!(err, CoachError::NotFound { entity: "rep", .. }));
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let store = InMemoryStore::default();
        let now = Utc::now();
        store.push_record(record_at("rep-1", "c-1", now - Duration::hours(1), SkillScores::uniform(2)));
        store.push_record(record_at("rep-1", "c-1", now, SkillScores::uniform(4)));
        store.push_record(record_at("rep-1", "c-2", now, SkillScores::uniform(1)));

        let history = service(&store).history("c-1").await.unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].coached_at, now);
        assert_eq!(history[0].scores.get(Skill::Closing), Some(4));
    }
}
