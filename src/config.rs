use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ClientConfig;
use crate::dashboard::DashboardConfig;
use crate::logging::{LogConfig, LogTarget};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "cinderdash.toml";
pub const ENV_PREFIX: &str = "CINDERDASH_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    MissingFile(PathBuf),
    #[error(transparent)]
    Load(#[from] figment::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the backup service
    pub server_url: String,
    pub poll_interval_secs: u64,
    pub settle_short_ms: u64,
    pub settle_long_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_interval_secs: Option<u64>,
    pub verbose: bool,
    pub json_logs: bool,
    /// Log destination while the terminal UI owns the screen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            poll_interval_secs: 30,
            settle_short_ms: 1000,
            settle_long_ms: 2000,
            request_timeout_secs: None,
            health_interval_secs: None,
            verbose: false,
            json_logs: false,
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Layer defaults, the TOML file, `CINDERDASH_*` variables and CLI overrides.
    ///
    /// An explicit `config_file` must exist; the default file is optional.
    pub fn load<T: Serialize>(
        config_file: Option<&Path>,
        overrides: Option<&T>,
    ) -> Result<Self, ConfigError> {
        let file = match config_file {
            Some(path) if !path.exists() => return Err(ConfigError::MissingFile(path.to_path_buf())),
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX));
        if let Some(overrides) = overrides {
            figment = figment.merge(Serialized::defaults(overrides));
        }

        let config: AppConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(self.server_url.trim()).map_err(|e| ConfigError::Invalid {
            field: "server_url",
            reason: format!("{} ({})", e, self.server_url),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                field: "server_url",
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let positive = [
            ("poll_interval_secs", Some(self.poll_interval_secs)),
            ("settle_short_ms", Some(self.settle_short_ms)),
            ("settle_long_ms", Some(self.settle_long_ms)),
            ("request_timeout_secs", self.request_timeout_secs),
            ("health_interval_secs", self.health_interval_secs),
        ];
        for (field, value) in positive {
            if value == Some(0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn dashboard_config(&self) -> DashboardConfig {
        DashboardConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            settle_short: Duration::from_millis(self.settle_short_ms),
            settle_long: Duration::from_millis(self.settle_long_ms),
            health_interval: self.health_interval_secs.map(Duration::from_secs),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            server_url: self.server_url.clone(),
            timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Logging setup. The terminal UI must not log to the terminal.
    pub fn log_config(&self, interactive: bool) -> LogConfig {
        let target = match (&self.log_file, interactive) {
            (Some(path), _) => LogTarget::File(path.clone()),
            (None, true) => LogTarget::Discard,
            (None, false) => LogTarget::Stderr,
        };
        LogConfig {
            json: self.json_logs,
            verbose: self.verbose,
            target,
        }
    }
}
