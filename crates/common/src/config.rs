use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Absent when only snapshot-reading components run.
    #[serde(default)]
    pub github: Option<GithubConfig>,
    #[serde(default)]
    pub collector: CollectorConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(".")
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Config::builder()
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/default")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/local")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    /// Opaque bearer token. Must never appear in log output.
    pub token: String,
    #[serde(default = "GithubConfig::default_user_agent")]
    pub user_agent: String,
    #[serde(default = "GithubConfig::default_api_base")]
    pub api_base: String,
}

impl GithubConfig {
    fn default_user_agent() -> String {
        "devmetrics-collector".to_string()
    }

    fn default_api_base() -> String {
        "https://api.github.com/".to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    /// The host API serves 30 items per page by default; a page shorter
    /// than this signals the end of a collection.
    #[serde(default = "CollectorConfig::default_page_size")]
    pub page_size: u32,
    #[serde(default = "CollectorConfig::default_snapshot_dir")]
    pub snapshot_dir: String,
    #[serde(default = "CollectorConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl CollectorConfig {
    const fn default_page_size() -> u32 {
        30
    }

    fn default_snapshot_dir() -> String {
        "data".to_string()
    }

    const fn default_timeout_secs() -> u64 {
        30
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            page_size: Self::default_page_size(),
            snapshot_dir: Self::default_snapshot_dir(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}
