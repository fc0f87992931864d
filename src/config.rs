use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::assistant::Timings;

const CONFIG_FILE: &str = "config.json";

pub const ENV_DB: &str = "TASKPILOT_DB";
pub const ENV_ASSISTANT_URL: &str = "TASKPILOT_ASSISTANT_URL";
pub const ENV_HR_URL: &str = "TASKPILOT_HR_URL";
pub const ENV_API_KEY: &str = "TASKPILOT_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store location. Defaults to the platform data directory.
    pub db_path: Option<PathBuf>,
    /// Base URL of the remote assistant. When unset the chat panel answers
    /// locally.
    pub assistant_url: Option<String>,
    /// Base URL of the HR backend.
    pub hr_url: Option<String>,
    /// Bearer token sent to both backends.
    pub api_key: Option<String>,
    pub escalation_notice_delay_ms: u64,
    pub refresh_delay_ms: u64,
    pub priority_notice_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            assistant_url: None,
            hr_url: None,
            api_key: None,
            escalation_notice_delay_ms: 1000,
            refresh_delay_ms: 2000,
            priority_notice_delay_ms: 1500,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from the user's config directory, then apply
    /// environment overrides. A missing or unreadable file yields defaults.
    pub fn load() -> Self {
        let mut config = match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    fn try_load() -> Result<Self> {
        let config_path = config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save the current configuration to disk.
    pub fn save(&self) -> Result<()> {
        let config_path = config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Apply overrides from `lookup`, normally the process environment.
    /// Empty values are treated as unset.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(ENV_DB) {
            self.db_path = Some(PathBuf::from(path));
        }
        if let Some(url) = get(ENV_ASSISTANT_URL) {
            self.assistant_url = Some(url);
        }
        if let Some(url) = get(ENV_HR_URL) {
            self.hr_url = Some(url);
        }
        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
    }

    pub fn timings(&self) -> Timings {
        Timings {
            escalation_notice: Duration::from_millis(self.escalation_notice_delay_ms),
            board_refresh: Duration::from_millis(self.refresh_delay_ms),
            priority_notice: Duration::from_millis(self.priority_notice_delay_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn config_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "taskpilot")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(dirs.config_dir().join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn overrides_replace_file_values() {
        let env: HashMap<&str, &str> = [
            (ENV_ASSISTANT_URL, "http://localhost:8000"),
            (ENV_API_KEY, "secret"),
            (ENV_HR_URL, "  "),
        ]
        .into_iter()
        .collect();

        let mut config = Config {
            hr_url: Some("http://hr.internal".to_string()),
            ..Config::default()
        };
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.assistant_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.hr_url.as_deref(), Some("http://hr.internal"));
        assert!(config.db_path.is_none());
    }

    #[test]
    fn partial_file_keeps_default_timings() {
        let config: Config = serde_json::from_str(r#"{"assistant_url": "http://x"}"#).unwrap();
        assert_eq!(config.escalation_notice_delay_ms, 1000);
        assert_eq!(config.timings().board_refresh, Duration::from_millis(2000));
    }
}
