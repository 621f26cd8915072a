//! Coaching pipeline logic and repository trait definitions for CallCoach.
//!
//! This crate defines the "ports" (repository and provider traits) that the
//! infrastructure layer implements. It depends only on `callcoach-types` --
//! never on `callcoach-infra` or any database/HTTP crate.

pub mod artifact;
pub mod ledger;
pub mod llm;
pub mod prompt;
pub mod repository;
pub mod service;
pub mod transcript;

#[cfg(test)]
pub(crate) mod testing;
