//! Configuration Module
//! File-path configuration for the two CENIPA exports.

use std::path::PathBuf;

use serde::Deserialize;

/// Optional configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "aeroscope.json";

pub const DEFAULT_OCCURRENCE_CSV: &str = "data/ocorrencia.csv";
pub const DEFAULT_AIRCRAFT_CSV: &str = "data/aeronave.csv";

/// Paths to the two dataset exports. Both can still be overridden from the
/// file pickers in the GUI.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub occurrence_csv: PathBuf,
    pub aircraft_csv: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            occurrence_csv: PathBuf::from(DEFAULT_OCCURRENCE_CSV),
            aircraft_csv: PathBuf::from(DEFAULT_AIRCRAFT_CSV),
        }
    }
}

impl AppConfig {
    /// Read `aeroscope.json` if present; fall back to the defaults when the
    /// file is absent or invalid.
    pub fn load_or_default() -> Self {
        match std::fs::read_to_string(CONFIG_FILE) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => {
                    tracing::info!(path = CONFIG_FILE, "loaded configuration");
                    config
                }
                Err(error) => {
                    tracing::warn!(%error, path = CONFIG_FILE, "invalid configuration, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_data_directory() {
        let config = AppConfig::default();
        assert_eq!(config.occurrence_csv, PathBuf::from("data/ocorrencia.csv"));
        assert_eq!(config.aircraft_csv, PathBuf::from("data/aeronave.csv"));
    }

    #[test]
    fn partial_config_keeps_defaults_for_missing_fields() {
        let config: AppConfig =
            serde_json::from_str(r#"{"occurrence_csv": "/tmp/occ.csv"}"#).unwrap();
        assert_eq!(config.occurrence_csv, PathBuf::from("/tmp/occ.csv"));
        assert_eq!(config.aircraft_csv, PathBuf::from("data/aeronave.csv"));
    }
}
