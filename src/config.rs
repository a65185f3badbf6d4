use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Energy Directory";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DB_FILE_NAME: &str = "global_energy_db.sqlite";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable overriding the database location.
pub const DB_PATH_ENV: &str = "ENERGY_DIRECTORY_DB";
/// Environment variable carrying the Gemini API key.
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Get the application data directory (platform data dir, or the working
/// directory when none can be determined)
pub fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("energy-directory"))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn default_db_path() -> PathBuf {
    app_data_dir().join(DB_FILE_NAME)
}

pub fn config_file_path() -> PathBuf {
    app_data_dir().join(CONFIG_FILE_NAME)
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "energy_directory_lib=info,warn"
}

/// Settings resolved once at startup.
///
/// The `*_enabled` flags gate optional operations; a disabled operation
/// reports `FeatureUnavailable` instead of silently doing less.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub pdf_export_enabled: bool,
    pub pdf_scan_enabled: bool,
    pub ai_search_enabled: bool,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub http_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            pdf_export_enabled: true,
            pdf_scan_enabled: true,
            ai_search_enabled: false,
            gemini_api_key: None,
            gemini_model: "gemini-pro".into(),
            http_timeout_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load configuration in priority order:
    /// 1. explicit config file, else `<data dir>/config.toml` if present
    /// 2. environment overrides (`ENERGY_DIRECTORY_DB`, `GEMINI_API_KEY`)
    pub fn load(explicit_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit_file {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = config_file_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(db) = lookup(DB_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            self.database_path = PathBuf::from(db);
        }
        if let Some(key) = lookup(GEMINI_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.gemini_api_key = Some(key);
        }
    }

    /// API key usable for AI search, if AI search is switched on.
    pub fn ai_search_key(&self) -> Option<&str> {
        if !self.ai_search_enabled {
            return None;
        }
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_path_under_app_data() {
        let db = default_db_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with(DB_FILE_NAME));
    }

    #[test]
    fn defaults_enable_pdf_and_disable_ai() {
        let config = AppConfig::default();
        assert!(config.pdf_export_enabled);
        assert!(config.pdf_scan_enabled);
        assert!(!config.ai_search_enabled);
        assert!(config.ai_search_key().is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml("pdf_export_enabled = false\n").unwrap();
        assert!(!config.pdf_export_enabled);
        assert!(config.pdf_scan_enabled);
        assert_eq!(config.gemini_model, "gemini-pro");
        assert_eq!(config.http_timeout_secs, 60);
    }

    #[test]
    fn full_toml_parses() {
        let config = AppConfig::from_toml(
            r#"
            database_path = "/tmp/producers.sqlite"
            ai_search_enabled = true
            gemini_api_key = "abc"
            gemini_model = "gemini-1.5-flash"
            http_timeout_secs = 15
            "#,
        )
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/producers.sqlite"));
        assert_eq!(config.ai_search_key(), Some("abc"));
        assert_eq!(config.gemini_model, "gemini-1.5-flash");
        assert_eq!(config.http_timeout_secs, 15);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "pdf_export_enabled = \"maybe\"").unwrap();
        assert!(matches!(AppConfig::from_file(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn missing_explicit_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = AppConfig::from_toml("gemini_api_key = \"from-file\"").unwrap();
        config.apply_env(|key| match key {
            DB_PATH_ENV => Some("/data/override.sqlite".into()),
            GEMINI_KEY_ENV => Some("from-env".into()),
            _ => None,
        });
        assert_eq!(config.database_path, PathBuf::from("/data/override.sqlite"));
        assert_eq!(config.gemini_api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn blank_key_does_not_enable_ai() {
        let config = AppConfig::from_toml("ai_search_enabled = true\ngemini_api_key = \"  \"").unwrap();
        assert!(config.ai_search_key().is_none());
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }
}
