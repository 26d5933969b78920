//! Scraper settings: defaults, optional TOML file, environment overrides.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vitibrasil_api::ClientConfig;

use crate::error::DataError;
use crate::retry::RetryConfig;

pub const DEFAULT_BASE_URL: &str = "http://vitibrasil.cnpuv.embrapa.br";
pub const DEFAULT_PAGE_PATH: &str = "index.php";
pub const DEFAULT_USER_AGENT: &str =
    concat!("vitibrasil-scraper/", env!("CARGO_PKG_VERSION"), " (+statistics extraction)");
/// Upper bound on concurrent page requests against the one upstream host.
pub const MAX_CONCURRENCY: usize = 64;

/// Everything the engine needs to reach the site.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ScraperConfig {
    pub base_url: String,
    pub page_path: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_concurrency: usize,
    pub retry: RetryConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_path: DEFAULT_PAGE_PATH.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10,
            max_concurrency: 5,
            retry: RetryConfig::default(),
        }
    }
}

impl ScraperConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, DataError> {
        toml::from_str(raw).map_err(|e| DataError::Config(format!("invalid config file: {}", e)))
    }

    /// Defaults, then the TOML file at `path` if given, then the process
    /// environment. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, DataError> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    DataError::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                tracing::debug!("Loaded config from {}", path.display());
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<(), DataError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup`. Blank values are ignored;
    /// unparseable numbers are a configuration error.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), DataError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|val| !val.trim().is_empty());

        if let Some(val) = var("TARGET_BASE_URL") {
            self.base_url = val.trim().to_string();
        }
        if let Some(val) = var("TARGET_PAGE_PATH") {
            self.page_path = val.trim().to_string();
        }
        if let Some(val) = var("USER_AGENT") {
            self.user_agent = val.trim().to_string();
        }
        if let Some(val) = var("TIMEOUT") {
            self.timeout_secs = parse_env("TIMEOUT", &val)?;
        }
        if let Some(val) = var("SCRAPER_MAX_CONCURRENCY") {
            self.max_concurrency = parse_env("SCRAPER_MAX_CONCURRENCY", &val)?;
        }
        if let Some(val) = var("SCRAPER_RETRY_ATTEMPTS") {
            self.retry.max_retries = parse_env("SCRAPER_RETRY_ATTEMPTS", &val)?;
        }
        if let Some(val) = var("SCRAPER_RETRY_BASE_MS") {
            self.retry.base_delay_ms = parse_env("SCRAPER_RETRY_BASE_MS", &val)?;
        }
        if let Some(val) = var("SCRAPER_RETRY_MAX_MS") {
            self.retry.max_delay_ms = parse_env("SCRAPER_RETRY_MAX_MS", &val)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.base_url.trim().is_empty() {
            return Err(DataError::Config("base_url must not be empty".to_string()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(DataError::Config("user_agent must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(DataError::Config("timeout_secs must be positive".to_string()));
        }
        if self.max_concurrency == 0 {
            return Err(DataError::Config(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.max_concurrency > MAX_CONCURRENCY {
            return Err(DataError::Config(format!(
                "max_concurrency must be at most {} (got {})",
                MAX_CONCURRENCY, self.max_concurrency
            )));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(DataError::Config(format!(
                "retry base delay ({} ms) exceeds max delay ({} ms)",
                self.retry.base_delay_ms, self.retry.max_delay_ms
            )));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout: self.timeout(),
        }
    }
}

fn parse_env<T: FromStr>(key: &str, val: &str) -> Result<T, DataError> {
    val.trim()
        .parse::<T>()
        .map_err(|_| DataError::Config(format!("{} has invalid value {:?}", key, val)))
}
