//! Rep ledger repository trait.

use callcoach_types::error::RepositoryError;
use callcoach_types::ledger::RepLedgerEntry;
use callcoach_types::skill::Skill;

/// Store of per-rep, per-skill ledger entries keyed by `(rep_id, skill)`.
pub trait LedgerRepository: Send + Sync {
    fn get(
        &self,
        rep_id: &str,
        skill: Skill,
    ) -> impl std::future::Future<Output = Result<Option<RepLedgerEntry>, RepositoryError>> + Send;

    /// Insert or fully overwrite the entry for `(entry.rep_id, entry.skill)`.
    fn upsert(
        &self,
        entry: &RepLedgerEntry,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Every entry for a rep, in skill enumeration order.
    fn list_for_rep(
        &self,
        rep_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<RepLedgerEntry>, RepositoryError>> + Send;
}
