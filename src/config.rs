use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, Result};

const APP_DIR: &str = "devbytes-sync";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_playlist_url")]
    pub playlist_url: String,

    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_minutes: u32,

    #[serde(default = "default_initial_backoff")]
    pub retry_initial_backoff_secs: u64,

    #[serde(default = "default_max_backoff")]
    pub retry_max_backoff_secs: u64,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR);
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("videos.db").to_string_lossy().to_string()
}

fn default_playlist_url() -> String {
    "https://devbytes.udacity.com/devbytes.json".to_string()
}

fn default_refresh_interval() -> u32 {
    // once a day
    24 * 60
}

fn default_initial_backoff() -> u64 {
    30
}

fn default_max_backoff() -> u64 {
    5 * 60 * 60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            playlist_url: default_playlist_url(),
            refresh_interval_minutes: default_refresh_interval(),
            retry_initial_backoff_secs: default_initial_backoff(),
            retry_max_backoff_secs: default_max_backoff(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Config>(&content)?
        } else {
            let config = Config::default();
            config.save()?;
            config
        };

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

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.playlist_url)
            .map_err(|e| AppError::Config(format!("invalid playlist_url: {}", e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(AppError::Config(format!(
                "playlist_url must be http(s), got {}",
                url.scheme()
            )));
        }
        if self.refresh_interval_minutes == 0 {
            return Err(AppError::Config(
                "refresh_interval_minutes must be greater than zero".to_string(),
            ));
        }
        if self.retry_initial_backoff_secs == 0
            || self.retry_max_backoff_secs < self.retry_initial_backoff_secs
        {
            return Err(AppError::Config(
                "retry backoff must be non-zero and max >= initial".to_string(),
            ));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.refresh_interval_minutes) * 60)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }
}
