//! Configuration management for the pypas client
//!
//! The global user config file (`~/.pypas.toml` by default) stores the access
//! token together with optional client-wide settings. Everything has a
//! zero-config default, so a missing file simply means "use the defaults".
//!
//! Sources are applied in this order:
//! 1. Default values
//! 2. Config file (if it exists)
//! 3. Environment variables (including a `.env` file loaded by `main`)
//! 4. CLI arguments (`--config`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{ClientConfig, Endpoints, ExerciseSettings};
use crate::constants::{env, exercise, service};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Access token stored by `pypas auth`
    pub token: Option<String>,
    /// Remote service settings
    pub service: ServiceConfigToml,
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Exercise workspace settings
    pub exercise: ExerciseConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// File this configuration was loaded from (or would be saved to)
    #[serde(skip)]
    pub path: PathBuf,
}

/// TOML-friendly service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfigToml {
    pub base_url: String,
    pub auth_path: String,
    pub get_exercise_path: String,
    pub exercise_info_path: String,
    pub put_assignment_path: String,
    pub log_path: String,
    pub list_exercises_path: String,
    pub pull_path: String,
}

impl Default for ServiceConfigToml {
    fn default() -> Self {
        Self {
            base_url: service::BASE_URL.to_string(),
            auth_path: service::AUTH_PATH.to_string(),
            get_exercise_path: service::GET_EXERCISE_PATH.to_string(),
            exercise_info_path: service::EXERCISE_INFO_PATH.to_string(),
            put_assignment_path: service::PUT_ASSIGNMENT_PATH.to_string(),
            log_path: service::LOG_PATH.to_string(),
            list_exercises_path: service::LIST_EXERCISES_PATH.to_string(),
            pull_path: service::PULL_PATH.to_string(),
        }
    }
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Request timeout in seconds (None = transport default)
    pub request_timeout_secs: Option<u64>,
    /// Connect timeout in seconds (None = transport default)
    pub connect_timeout_secs: Option<u64>,
    /// Draw progress bars for downloads and uploads
    pub show_progress: bool,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            request_timeout_secs: None,
            connect_timeout_secs: None,
            show_progress: true,
        }
    }
}

/// TOML-friendly exercise configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseConfigToml {
    /// Per-exercise config file name
    pub config_file: String,
    /// Maximum uploaded bundle size in bytes
    pub large_file_size: u64,
    /// Version assumed for exercises without one
    pub default_version: String,
    /// Environment variable that disables version checks when set to `1`
    pub skip_version_check_var: String,
    /// Disable version checks altogether
    pub skip_version_check: bool,
    /// Python interpreter used by `pypas run`
    pub python: String,
}

impl Default for ExerciseConfigToml {
    fn default() -> Self {
        Self {
            config_file: exercise::CONFIG_FILE.to_string(),
            large_file_size: exercise::LARGE_FILE_SIZE,
            default_version: exercise::DEFAULT_VERSION.to_string(),
            skip_version_check_var: env::SKIP_VERSION_CHECK.to_string(),
            skip_version_check: false,
            python: exercise::DEFAULT_PYTHON.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when no verbosity flag is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration with multi-source precedence
    ///
    /// An explicit `config_file_override` must exist; the default location may
    /// be missing, in which case defaults are used.
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let explicit = config_file_override.is_some();
        let path = match config_file_override {
            Some(path) => path,
            None => Self::default_config_path()?,
        };

        let mut config = if path.exists() {
            debug!("Loading config from: {}", path.display());
            Self::load_from_file(&path).await?
        } else if explicit {
            return Err(ConfigError::NotFound { path });
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.path = path;

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Resolve the global config path from `MAIN_CONFIG_FILE` or the home directory
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        if let Ok(path) = std::env::var(env::MAIN_CONFIG_FILE) {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(exercise::MAIN_CONFIG_FILE))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig =
            toml::from_str(&content).map_err(|source| ConfigError::InvalidFormat {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Apply environment variable overrides using the given lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(env::BASE_URL) {
            self.service.base_url = base_url;
        }
        if let Some(config_file) = lookup(env::EXERCISE_CONFIG_FILE) {
            self.exercise.config_file = config_file;
        }
        if let Some(size) = lookup(env::LARGE_FILE_SIZE) {
            self.exercise.large_file_size =
                size.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    field: env::LARGE_FILE_SIZE.to_string(),
                    value: size.clone(),
                    reason: "Expected a size in bytes".to_string(),
                })?;
        }
        if let Some(version) = lookup(env::DEFAULT_EXERCISE_VERSION) {
            self.exercise.default_version = version;
        }
        if let Some(var) = lookup(env::SKIP_VERSION_CHECK_VAR) {
            self.exercise.skip_version_check_var = var;
        }
        if let Some(python) = lookup(env::PYTHON) {
            self.exercise.python = python;
        }
        if lookup(&self.exercise.skip_version_check_var).as_deref() == Some("1") {
            self.exercise.skip_version_check = true;
        }
        Ok(())
    }

    /// Stored token, if any (an empty token counts as none)
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }

    /// Convert TOML-friendly configuration to runtime configuration
    pub fn to_runtime_config(&self) -> ConfigResult<(ClientConfig, Endpoints, ExerciseSettings)> {
        Ok((
            self.client.to_runtime_config(),
            self.service.to_runtime_config()?,
            self.exercise.to_runtime_config(&self.path),
        ))
    }
}

impl ServiceConfigToml {
    /// Convert to runtime endpoints
    pub fn to_runtime_config(&self) -> ConfigResult<Endpoints> {
        let base_url = url::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "service.base_url".to_string(),
            value: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Endpoints {
            base_url,
            auth: self.auth_path.clone(),
            get_exercise: self.get_exercise_path.clone(),
            exercise_info: self.exercise_info_path.clone(),
            put_assignment: self.put_assignment_path.clone(),
            log: self.log_path.clone(),
            list_exercises: self.list_exercises_path.clone(),
            pull: self.pull_path.clone(),
        })
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
            show_progress: self.show_progress,
        }
    }
}

impl ExerciseConfigToml {
    /// Convert to runtime ExerciseSettings
    pub fn to_runtime_config(&self, main_config_file: &Path) -> ExerciseSettings {
        ExerciseSettings {
            config_file: self.config_file.clone(),
            main_config_file: main_config_file.to_path_buf(),
            large_file_size: self.large_file_size,
            default_version: self.default_version.clone(),
            skip_version_check_var: self.skip_version_check_var.clone(),
            skip_version_check: self.skip_version_check,
            python: self.python.clone(),
            temp_dir: std::env::temp_dir(),
        }
    }
}
