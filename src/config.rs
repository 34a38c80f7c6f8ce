use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Identity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    pub tmdb_api_key: Option<String>,

    #[serde(default = "default_tmdb_base_url")]
    pub tmdb_base_url: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_cache_max_age")]
    pub cache_max_age_days: i64,

    /// Local identity used by the command line front end.
    #[serde(default)]
    pub user: Option<Identity>,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("show-tracker");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("shows.db").to_string_lossy().to_string()
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_cache_max_age() -> i64 {
    7
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            tmdb_api_key: None,
            tmdb_base_url: default_tmdb_base_url(),
            language: default_language(),
            request_timeout_secs: default_request_timeout(),
            cache_max_age_days: default_cache_max_age(),
            user: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            let config = Config::default();
            config.save()?;
            config
        };

        Ok(config.with_env_overrides())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("show-tracker")
            .join("config.toml")
    }

    /// `TMDB_API_KEY` from the environment takes precedence over the file.
    fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("TMDB_API_KEY") {
            if !key.is_empty() {
                self.tmdb_api_key = Some(key);
            }
        }
        self
    }

    fn validate(&self) -> Result<()> {
        Url::parse(&self.tmdb_base_url).map_err(|e| {
            AppError::Config(format!("invalid tmdb_base_url '{}': {}", self.tmdb_base_url, e))
        })?;
        if self.cache_max_age_days < 0 {
            return Err(AppError::Config(
                "cache_max_age_days must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tmdb_api_key = \"abc\"").unwrap();
        writeln!(file, "cache_max_age_days = 3").unwrap();
        writeln!(file, "[user]").unwrap();
        writeln!(file, "google_id = \"g-1\"").unwrap();
        writeln!(file, "email = \"me@example.com\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.tmdb_api_key.as_deref(), Some("abc"));
        assert_eq!(config.cache_max_age_days, 3);
        assert_eq!(config.tmdb_base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.language, "en-US");
        let user = config.user.unwrap();
        assert_eq!(user.google_id, "g-1");
        assert!(user.name.is_none());
    }

    #[test]
    fn rejects_bad_base_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tmdb_base_url = \"not a url\"").unwrap();

        assert!(matches!(
            Config::load_from(file.path()),
            Err(AppError::Config(_))
        ));
    }
}
