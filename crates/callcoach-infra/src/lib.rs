//! Infrastructure layer for CallCoach.
//!
//! Contains implementations of the repository and provider traits defined in
//! `callcoach-core`: SQLite storage, the filesystem transcript store, and the
//! Claude, Gemini and OpenAI HTTP clients.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod secret;
pub mod sqlite;
