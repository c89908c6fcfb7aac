//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PropshotError, PropshotResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Persisted icon settings file.
    pub settings_path: PathBuf,

    /// Transcoder binary. A bare name is resolved through `PATH`.
    pub ffmpeg: PathBuf,

    /// Directory that holds per-target frame sequences.
    pub sequence_root: PathBuf,

    /// Encoder defaults.
    pub encoding: EncodingDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default encoder parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingDefaults {
    /// JPEG quality in `[1, 100]`.
    pub jpeg_quality: u8,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "propshot=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings_path: default_data_dir().join("icon-settings.json"),
            ffmpeg: PathBuf::from("ffmpeg"),
            sequence_root: default_data_dir().join("sequences"),
            encoding: EncodingDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for EncodingDefaults {
    fn default() -> Self {
        Self { jpeg_quality: 75 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location.
    ///
    /// A missing file yields the defaults; an unreadable or malformed file
    /// is an error so the caller can report it once logging is up.
    pub fn try_load() -> PropshotResult<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load config from `path`, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> PropshotResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            PropshotError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            PropshotError::config(format!("failed to parse {}: {e}", path.display()))
        })
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("propshot").join("config.json")
}

/// Default data directory (settings file and frame sequences).
fn default_data_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("propshot")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_jpeg_quality() {
        let config = AppConfig::default();
        assert_eq!(config.encoding.jpeg_quality, 75);
        assert_eq!(config.ffmpeg, PathBuf::from("ffmpeg"));
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"ffmpeg": "/opt/ffmpeg/bin/ffmpeg"}"#)
            .expect("partial config should parse");
        assert_eq!(config.ffmpeg, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.logging.level, "info");
        assert!(config.settings_path.ends_with("icon-settings.json"));
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("propshot_test_config_missing/config.json");
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_malformed_file_is_config_error() {
        let dir = std::env::temp_dir().join("propshot_test_config_malformed");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, "{ nope").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, PropshotError::Config { .. }));
        assert!(err.to_string().contains("config.json"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
