use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use reqwest::Url;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::store::StoreConfig;
use crate::error::{ConfigError, SESSION_EXPIRED_MESSAGE};

pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";
pub const ENV_PREFIX: &str = "STOREFRONT_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: backend endpoints, session persistence, UI feedback and logging.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: StoreConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Load config from a YAML file, with `STOREFRONT_`-prefixed environment
/// variables layered on top (`STOREFRONT_BACKEND__BASE_URL=...`).
pub fn load_config(path: impl AsRef<Path>) -> Result<ConfigV1, ConfigError> {
    let figment = Figment::new()
        .merge(Yaml::file(path.as_ref()))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    extract_config(figment)
}

/// Extracts a versioned config from any figment (used by tests with `Yaml::string`).
pub fn extract_config(figment: Figment) -> Result<ConfigV1, ConfigError> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
    // handle configuration migration between versions here when necessary
}

/// Render the JSON schema for the configuration.
pub fn config_schema() -> Result<String, serde_json::Error> {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema)
}

/// Where the storefront REST API lives and which paths the session uses.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    #[serde(default = "default_logout_path")]
    pub logout_path: String,
}

impl BackendConfig {
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })
    }
}

fn default_timeout_in_ms() -> u64 {
    10_000
}

fn default_login_path() -> String {
    "/api/v1/auth/login".to_string()
}

fn default_refresh_path() -> String {
    "/api/v1/auth/refresh".to_string()
}

fn default_logout_path() -> String {
    "/api/v1/auth/logout".to_string()
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct NavigationConfig {
    #[serde(default = "default_login_route")]
    pub login_route: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        NavigationConfig {
            login_route: default_login_route(),
        }
    }
}

fn default_login_route() -> String {
    "/login".to_string()
}

/// Texts of the toast shown when the session is torn down.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct NotificationConfig {
    #[serde(default = "default_expired_title")]
    pub expired_title: String,
    #[serde(default = "default_expired_message")]
    pub expired_message: String,
    /// How many toasts the log notifier keeps for inspection.
    #[serde(default = "default_history")]
    pub history: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        NotificationConfig {
            expired_title: default_expired_title(),
            expired_message: default_expired_message(),
            history: default_history(),
        }
    }
}

fn default_expired_title() -> String {
    "Session expired".to_string()
}

fn default_expired_message() -> String {
    SESSION_EXPIRED_MESSAGE.to_string()
}

fn default_history() -> usize {
    16
}
