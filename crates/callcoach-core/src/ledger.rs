//! Rolling per-skill trend ledger.
//!
//! After every coaching run the rep's ledger is recomputed from the most
//! recent [`ROLLING_WINDOW`] coaching records rather than folded forward from
//! the newest score, so re-runs, backfills and out-of-order inserts all
//! converge on the same result.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use callcoach_types::coaching::{CoachingRecord, SkillScores};
use callcoach_types::error::RepositoryError;
use callcoach_types::ledger::{
    FOCUS_SCORE_THRESHOLD, FOCUS_TREND_THRESHOLD, ROLLING_WINDOW, RepLedgerEntry,
};
use callcoach_types::skill::Skill;

use crate::repository::coaching::CoachingRepository;
use crate::repository::ledger::LedgerRepository;

/// Newest-first, at most [`ROLLING_WINDOW`] records.
///
/// Ties on `coached_at` break on the record id (UUID v7, creation ordered).
pub fn select_window(mut records: Vec<CoachingRecord>) -> Vec<CoachingRecord> {
    records.sort_by(|a, b| {
        b.coached_at
            .cmp(&a.coached_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    records.truncate(ROLLING_WINDOW);
    records
}

/// Unweighted mean of `skill` over the records that scored it.
pub fn rolling_score(window: &[CoachingRecord], skill: Skill) -> Option<f64> {
    let scores: Vec<f64> = window
        .iter()
        .filter_map(|r| r.scores.get(skill))
        .map(f64::from)
        .collect();
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().sum::<f64>() / scores.len() as f64)
}

/// Whether a skill needs attention. Both thresholds are strict.
pub fn is_focus_area(rolling_score: f64, trend_delta: f64) -> bool {
    rolling_score < FOCUS_SCORE_THRESHOLD || trend_delta < FOCUS_TREND_THRESHOLD
}

/// Build the replacement ledger entry for one rep and skill.
///
/// Without an existing entry the previous score equals the new one, so a
/// first entry always has a zero trend.
pub fn compute_entry(
    rep_id: &str,
    skill: Skill,
    rolling_score: f64,
    existing: Option<&RepLedgerEntry>,
    now: DateTime<Utc>,
) -> RepLedgerEntry {
    let prev_rolling_score = existing.map_or(rolling_score, |e| e.rolling_score);
    let trend_delta = rolling_score - prev_rolling_score;
    RepLedgerEntry {
        rep_id: rep_id.to_string(),
        skill,
        rolling_score,
        prev_rolling_score,
        trend_delta,
        last_updated: now,
        open_focus_area: is_focus_area(rolling_score, trend_delta),
    }
}

/// Recomputes and writes a rep's ledger entries.
///
/// The read-compute-write cycle for a rep holds that rep's lock, so two runs
/// for the same rep cannot interleave and lose a `prev_rolling_score`.
/// Different reps update concurrently.
pub struct TrendLedgerUpdater<C: CoachingRepository, L: LedgerRepository> {
    coaching: C,
    ledger: L,
    rep_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<C: CoachingRepository, L: LedgerRepository> TrendLedgerUpdater<C, L> {
    pub fn new(coaching: C, ledger: L) -> Self {
        Self {
            coaching,
            ledger,
            rep_locks: DashMap::new(),
        }
    }

    fn rep_lock(&self, rep_id: &str) -> Arc<Mutex<()>> {
        Arc::clone(
            self.rep_locks
                .entry(rep_id.to_string())
                .or_default()
                .value(),
        )
    }

    /// Recompute every skill for `rep_id` from the rolling window.
    ///
    /// `new_scores` are the scores of the record that triggered the update;
    /// that record must already be persisted. Skills with no score anywhere
    /// in the window are skipped. Returns the entries written, in skill order.
    #[tracing::instrument(name = "update_rep_ledger", skip(self, new_scores), fields(rep_id = %rep_id))]
    pub async fn update(
        &self,
        rep_id: &str,
        new_scores: &SkillScores,
    ) -> Result<Vec<RepLedgerEntry>, RepositoryError> {
        let lock = self.rep_lock(rep_id);
        let result = {
            let _guard = lock.lock().await;
            self.recompute(rep_id, new_scores).await
        };
        drop(lock);
        // Nobody else holds or waits on the lock once only the map's copy is left.
        self.rep_locks
            .remove_if(rep_id, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    async fn recompute(
        &self,
        rep_id: &str,
        new_scores: &SkillScores,
    ) -> Result<Vec<RepLedgerEntry>, RepositoryError> {
        let window = select_window(self.coaching.list_for_rep(rep_id).await?);
        debug!(
            window = window.len(),
            triggering_scores = new_scores.len(),
            "loaded rolling window"
        );

        let now = Utc::now();
        let mut written = Vec::with_capacity(Skill::ALL.len());
        for skill in Skill::ALL {
            let Some(rolling) = rolling_score(&window, skill) else {
                debug!(skill = %skill, "no scores in window, skipping");
                continue;
            };
            let existing = self.ledger.get(rep_id, skill).await?;
            let entry = compute_entry(rep_id, skill, rolling, existing.as_ref(), now);
            self.ledger.upsert(&entry).await?;
            written.push(entry);
        }

        let focus = written.iter().filter(|e| e.open_focus_area).count();
        info!(skills = written.len(), focus_areas = focus, "rep ledger updated");
        Ok(written)
    }
}
