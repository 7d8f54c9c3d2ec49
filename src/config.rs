// 配置加载: config.toml + 环境变量覆盖
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::format::Currency;
use crate::theme::ThemeMode;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub const ENV_CONFIG_PATH: &str = "TRIPBOOK_CONFIG";
pub const ENV_API_BASE_URL: &str = "TRIPBOOK_API_BASE_URL";
pub const ENV_USER_EMAIL: &str = "TRIPBOOK_USER_EMAIL";
pub const ENV_SERVER_ADDRESS: &str = "TRIPBOOK_SERVER_ADDRESS";

/// Top-level configuration, deserialized from TOML.
/// Every section is optional; missing ones take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub user: UserConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
    pub server: ServerConfig,
    /// File the values came from; `None` when running on defaults.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Where the booking backend lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_secs: 10,
        }
    }
}

/// The signed-in user. Authentication is mocked, so this is the whole profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: "user_test_001".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john.doe@example.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub theme: ThemeMode,
    pub currency: Currency,
    /// Flat fee added to the client-side price preview.
    pub service_fee: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: ThemeMode::Light,
            currency: Currency::Idr,
            service_fee: 35.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// When set, logs also go to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

/// Development backend settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    /// Artificial delay added to every response.
    pub latency_ms: u64,
    /// Probability in [0, 1] that a request fails with 503.
    pub failure_rate: f32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:5000".to_string(),
            latency_ms: 0,
            failure_rate: 0.0,
        }
    }
}

impl Config {
    /// Loads `.env`, then the file named by `TRIPBOOK_CONFIG` (or `config.toml`),
    /// then applies environment overrides. A missing file means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        // .env 不存在时忽略
        let _ = dotenvy::dotenv();

        let path = std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = if Path::new(&path).exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses one TOML file without consulting the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config_text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: Config = toml::from_str(&config_text)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Reports where the configuration came from. Called once logging is up,
    /// since `load` runs before the subscriber exists.
    pub fn log_source(&self) {
        match &self.source {
            Some(path) => tracing::info!(path = %path.display(), "loaded config"),
            None => tracing::info!("no config file found, using defaults"),
        }
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_BASE_URL) {
            self.api.base_url = url;
        }
        if let Some(email) = lookup(ENV_USER_EMAIL) {
            self.user.email = email;
        }
        if let Some(address) = lookup(ENV_SERVER_ADDRESS) {
            self.server.address = address;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api.base_url must start with http:// or https://, got {url:?}"
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.timeout_secs must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.server.failure_rate) {
            return Err(ConfigError::Invalid("server.failure_rate must be within [0, 1]".to_string()));
        }
        if self.display.service_fee < 0.0 {
            return Err(ConfigError::Invalid("display.service_fee must not be negative".to_string()));
        }
        Ok(())
    }
}
