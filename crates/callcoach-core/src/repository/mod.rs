//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (callcoach-infra) implements. The core crate never depends on any
//! specific storage technology.
//!
//! Implementations must serialize writes to the same table so that an
//! append or upsert never races another writer and loses an update.

pub mod call;
pub mod coaching;
pub mod ledger;
