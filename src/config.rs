use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const APP_DIR_NAME: &str = "dutycalls-notify";
const CONFIG_FILE_NAME: &str = "config.toml";

pub const ENV_CONFIG_PATH: &str = "DUTYCALLS_CONFIG";
pub const ENV_DEFAULT_CHANNEL: &str = "DUTYCALLS_DEFAULT_CHANNEL";
pub const ENV_USERNAME: &str = "DUTYCALLS_USERNAME";
pub const ENV_PASSWORD: &str = "DUTYCALLS_PASSWORD";
pub const ENV_API_URL: &str = "DUTYCALLS_API_URL";

/// Validated settings needed to set up the notification service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_channel: String,
    pub username: String,
    pub password: String,
    pub api_url: Option<String>,
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        let stored = StoredConfig::load()?;
        Self::resolve(stored, |key| env::var(key).ok())
    }

    /// Applies environment overrides on top of the stored file.
    pub fn resolve(
        stored: StoredConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let pick = |key: &str, fallback: Option<String>| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .or(fallback)
                .filter(|value| !value.trim().is_empty())
        };

        let default_channel = pick(ENV_DEFAULT_CHANNEL, stored.default_channel)
            .ok_or_else(|| missing("default_channel", ENV_DEFAULT_CHANNEL))?;
        let username = pick(ENV_USERNAME, stored.username)
            .ok_or_else(|| missing("username", ENV_USERNAME))?;
        let password = pick(ENV_PASSWORD, stored.password)
            .ok_or_else(|| missing("password", ENV_PASSWORD))?;
        let api_url = pick(ENV_API_URL, stored.api_url);

        Ok(Self {
            default_channel: default_channel.trim().to_string(),
            username: username.trim().to_string(),
            password,
            api_url,
        })
    }
}

fn missing(field: &str, env_key: &str) -> AppError {
    AppError::Configuration(format!(
        "{field} not configured; run `dutycalls-notify config init` or set {env_key}"
    ))
}

/// On-disk configuration as written by `config init`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from(&config_file_path()?)
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = toml::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(path, data)?;
        Ok(())
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| {
            AppError::Configuration("unable to determine the user config directory".to_string())
        })
}

pub fn config_file_path() -> AppResult<PathBuf> {
    resolve_config_path(env::var(ENV_CONFIG_PATH).ok())
}

/// An explicit path wins over the per-user config directory.
fn resolve_config_path(override_path: Option<String>) -> AppResult<PathBuf> {
    match override_path {
        Some(path) if !path.trim().is_empty() => Ok(PathBuf::from(path.trim())),
        _ => Ok(config_directory()?.join(CONFIG_FILE_NAME)),
    }
}
