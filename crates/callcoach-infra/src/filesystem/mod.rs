//! Filesystem adapters for CallCoach.
//!
//! Data directory layout:
//!
//! ```text
//! {data_dir}/
//!   config.toml
//!   callcoach.db
//!   transcripts/{call_id}.json
//! ```

pub mod transcript;

use std::path::PathBuf;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "CALLCOACH_DATA_DIR";

/// Resolve the data directory: `CALLCOACH_DATA_DIR`, else `~/.callcoach`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".callcoach")
}
