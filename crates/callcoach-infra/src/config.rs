//! Configuration loader for CallCoach.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`CoachConfig`]. Falls back to defaults when the file is missing or
//! malformed.

use std::path::Path;

use callcoach_types::config::CoachConfig;

/// Config file name inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Load configuration from `{data_dir}/config.toml`.
///
/// A missing file yields the defaults silently; an unreadable or unparsable
/// file yields the defaults with a warning.
pub async fn load_config(data_dir: &Path) -> CoachConfig {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return CoachConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return CoachConfig::default();
        }
    };

    match toml::from_str::<CoachConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            CoachConfig::default()
        }
    }
}
