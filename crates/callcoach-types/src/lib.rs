//! Shared domain types for CallCoach.
//!
//! This crate contains the core domain types used across the CallCoach
//! pipeline: skills, calls and transcripts, coaching artifacts and records,
//! rep ledger entries, the model registry, configuration and error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod call;
pub mod coaching;
pub mod config;
pub mod error;
pub mod ledger;
pub mod llm;
pub mod report;
pub mod skill;
