//! Configuration management for taskdeck
//!
//! This module handles loading, parsing, and validation of configuration files.

use crate::backend::TaskStatus;
use crate::constants::{CONFIG_GENERATED, STATUS_MESSAGE_SECONDS};
use crate::utils::datetime;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub notifications: NotificationsConfig,
    pub aws: AwsConfig,
    pub dictation: DictationConfig,
    pub storage: StorageConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

/// Task API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend kind: "rest" (hosted task API) or "local" (SQLite on this machine)
    pub backend: String,
    /// Task endpoint URL, e.g. "https://abc123.execute-api.us-east-1.amazonaws.com/prod/tasks"
    pub endpoint: String,
    /// Send the identity token as `Authorization: Bearer <token>`
    pub attach_id_token: bool,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Identity provider (Cognito user pool) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub region: String,
    pub user_pool_id: String,
    /// App client id (must allow USER_PASSWORD_AUTH)
    pub client_id: String,
    /// Overrides the regional endpoint, mostly for local testing
    pub endpoint: Option<String>,
    /// Keep the session on disk between runs
    pub remember_session: bool,
}

/// Login notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub enabled: bool,
    pub region: String,
    /// Name of the environment variable holding the SNS topic ARN
    pub topic_arn_env: String,
    /// Overrides the regional SNS endpoint
    pub endpoint: Option<String>,
}

/// Names of the environment variables carrying AWS credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    pub access_key_env: String,
    pub secret_key_env: String,
    pub session_token_env: String,
}

/// Speech-to-text dictation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DictationConfig {
    pub enabled: bool,
    pub region: String,
    pub language_code: String,
    pub sample_rate: u32,
    /// Recorder command writing raw little-endian f32 mono samples to stdout.
    /// `{sample_rate}` is replaced with the configured sample rate.
    pub recorder_command: Vec<String>,
}

/// Local persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Mirror the task cache into SQLite so lists show up before the first fetch.
    /// Has no effect with the `local` backend, which already stores tasks there.
    pub persist_cache: bool,
    /// Database file name inside the data directory
    pub database_file: String,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// View opened after login: "pending", "in_progress" or "completed"
    pub default_view: String,
    /// Seconds a success message stays visible
    pub message_timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write log records to a file in the data directory
    pub enabled: bool,
    /// One of "error", "warn", "info", "debug", "trace"
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            backend: "rest".to_string(),
            endpoint: String::new(),
            attach_id_token: true,
            timeout_seconds: 30,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            user_pool_id: String::new(),
            client_id: String::new(),
            endpoint: None,
            remember_session: true,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            region: "us-east-1".to_string(),
            topic_arn_env: "TASKDECK_SNS_TOPIC_ARN".to_string(),
            endpoint: None,
        }
    }
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            access_key_env: "AWS_ACCESS_KEY_ID".to_string(),
            secret_key_env: "AWS_SECRET_ACCESS_KEY".to_string(),
            session_token_env: "AWS_SESSION_TOKEN".to_string(),
        }
    }
}

impl Default for DictationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            region: "us-east-1".to_string(),
            language_code: "en-US".to_string(),
            sample_rate: 44100,
            recorder_command: vec![
                "arecord".to_string(),
                "-q".to_string(),
                "-t".to_string(),
                "raw".to_string(),
                "-f".to_string(),
                "FLOAT_LE".to_string(),
                "-c".to_string(),
                "1".to_string(),
                "-r".to_string(),
                "{sample_rate}".to_string(),
            ],
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            persist_cache: false,
            database_file: "tasks.db".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_view: "pending".to_string(),
            message_timeout_seconds: STATUS_MESSAGE_SECONDS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
        }
    }
}

impl UiConfig {
    /// The status list shown right after login
    pub fn default_status(&self) -> TaskStatus {
        self.default_view.parse().unwrap_or(TaskStatus::Pending)
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file()?;

        if let Some(path) = config_path {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Result<Option<PathBuf>> {
        let current_dir_config = PathBuf::from("taskdeck.toml");
        if current_dir_config.exists() {
            return Ok(Some(current_dir_config));
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("taskdeck").join("config.toml");
            if xdg_config.exists() {
                return Ok(Some(xdg_config));
            }
        }

        Ok(None)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        match self.api.backend.as_str() {
            "rest" => {
                if self.api.endpoint.trim().is_empty() {
                    anyhow::bail!("api.endpoint is required when api.backend = \"rest\"");
                }
                url::Url::parse(&self.api.endpoint)
                    .with_context(|| format!("Invalid api.endpoint '{}'", self.api.endpoint))?;
            }
            "local" => {}
            other => anyhow::bail!("Unsupported api.backend '{}'. Expected \"rest\" or \"local\"", other),
        }

        if self.api.timeout_seconds == 0 || self.api.timeout_seconds > 300 {
            anyhow::bail!(
                "api.timeout_seconds must be between 1 and 300, got {}",
                self.api.timeout_seconds
            );
        }

        if self.auth.client_id.trim().is_empty() {
            anyhow::bail!("auth.client_id is required");
        }
        if self.auth.region.trim().is_empty() {
            anyhow::bail!("auth.region cannot be empty");
        }

        if self.notifications.enabled && self.notifications.topic_arn_env.trim().is_empty() {
            anyhow::bail!("notifications.topic_arn_env cannot be empty when notifications are enabled");
        }

        if self.dictation.enabled {
            if !(8000..=48000).contains(&self.dictation.sample_rate) {
                anyhow::bail!(
                    "dictation.sample_rate must be between 8000 and 48000 Hz, got {}",
                    self.dictation.sample_rate
                );
            }
            if self.dictation.recorder_command.is_empty() {
                anyhow::bail!("dictation.recorder_command cannot be empty when dictation is enabled");
            }
            if self.dictation.language_code.trim().is_empty() {
                anyhow::bail!("dictation.language_code cannot be empty");
            }
        }

        if self.storage.database_file.trim().is_empty() {
            anyhow::bail!("storage.database_file cannot be empty");
        }

        if self.ui.default_view.parse::<TaskStatus>().is_err() {
            anyhow::bail!(
                "Invalid ui.default_view '{}'. Expected \"pending\", \"in_progress\" or \"completed\"",
                self.ui.default_view
            );
        }

        if self.logging.level.parse::<log::LevelFilter>().is_err() {
            anyhow::bail!("Invalid logging.level '{}'", self.logging.level);
        }

        Ok(())
    }

    /// Generate default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let toml_content = toml::to_string_pretty(&config).context("Failed to serialize default config")?;

        let header = format!(
            "# taskdeck Configuration File\n# Generated on {}\n#\n# Fill in api.endpoint and auth.client_id before the first run.\n\n",
            datetime::format_today()
        );

        let full_content = header + &toml_content;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        std::fs::write(&path, full_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        println!("{}: {}", CONFIG_GENERATED, path.as_ref().display());
        Ok(())
    }

    /// Get the XDG config directory path
    pub fn get_xdg_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
            .map(|dir| dir.join("taskdeck"))
    }

    /// Get the default config file path
    pub fn get_default_config_path() -> Result<PathBuf> {
        Ok(Self::get_xdg_config_dir()?.join("config.toml"))
    }

    /// Directory for the session file, the SQLite cache and the log file
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
            .map(|dir| dir.join("taskdeck"))
    }
}
