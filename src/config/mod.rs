use crate::core::assembler::GenerationSettings;
use crate::core::error::GemchatError;
use crate::core::retriever::RetryPolicy;
use crate::providers::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_LOCATION: &str = "Belfair, WA";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_temperature() -> f64 {
    0.8
}

fn default_thinking_budget() -> u32 {
    32768
}

fn default_max_retries() -> u32 {
    2
}

fn default_initial_retry_delay_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_thinking_budget")]
    pub thinking_budget: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_retry_delay_ms")]
    pub initial_retry_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub recheck_credential: bool,
    /// Shell command whose stdout is a fresh API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_command: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            location: default_location(),
            temperature: default_temperature(),
            thinking_budget: default_thinking_budget(),
            max_retries: default_max_retries(),
            initial_retry_delay_ms: default_initial_retry_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            recheck_credential: false,
            credential_command: None,
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

impl Config {
    fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gemchat")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Load from the default location, writing a default file on first run.
    pub fn load() -> Result<Config, GemchatError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Config, GemchatError> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config = serde_yml::from_str::<Config>(&contents)
                .map_err(|e| GemchatError::Config(format!("Parse {}: {}", path.display(), e)))?;
            config.validate()?;
            return Ok(config);
        }

        let config = Config::default();
        let _ = config.save_to(path);
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), GemchatError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let yaml_content = serde_yml::to_string(self)?;
        fs::write(path, yaml_content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), GemchatError> {
        if self.thinking_budget == 0 {
            return Err(GemchatError::Config(format!(
                "thinking_budget must be greater than zero for {}",
                self.model
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(GemchatError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(GemchatError::Config(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }
        if self.model.trim().is_empty() {
            return Err(GemchatError::Config("model must not be empty".to_string()));
        }
        Ok(())
    }

    /// Environment first, then the config file.
    pub fn resolve_api_key(&self, env_key: Option<String>) -> Option<String> {
        env_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            temperature: self.temperature,
            thinking_budget: self.thinking_budget,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: Duration::from_millis(self.initial_retry_delay_ms),
            recheck_credential: self.recheck_credential,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_is_filled_with_defaults() {
        let config: Config = serde_yml::from_str("location: Oslo, Norway\nmax_retries: 4\n").unwrap();
        assert_eq!(config.location, "Oslo, Norway");
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.thinking_budget, 32768);
        assert_eq!(config.retry_policy().initial_delay, Duration::from_millis(1000));
    }

    #[test]
    fn zero_thinking_budget_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "thinking_budget: 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, GemchatError::Config(msg) if msg.contains("thinking_budget")));
    }

    #[test]
    fn zero_request_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "request_timeout_secs: 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, GemchatError::Config(msg) if msg.contains("request_timeout_secs")));
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let config = Config {
            temperature: 3.5,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn env_key_wins_over_file_key() {
        let config = Config {
            api_key: Some("from-file".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_api_key(Some("from-env".to_string())).as_deref(),
            Some("from-env")
        );
        assert_eq!(
            config.resolve_api_key(Some("  ".to_string())).as_deref(),
            Some("from-file")
        );
        assert_eq!(Config::default().resolve_api_key(None), None);
    }
}
