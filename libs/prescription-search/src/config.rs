//! Configuration
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. `receita.toml` in the working directory, or the file named by `RECEITA_CONFIG`
//! 3. environment variables such as `RECEITA__BACKEND__URL` or
//!    `RECEITA__SEARCH__DEBOUNCE_MS`
//!
//! A `.env` file is read first so its variables take part in step 3.

use crate::error::{Error, Result};
use crate::store::RemoteStoreOptions;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_PATH_ENV: &str = "RECEITA_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "receita";
const ENV_PREFIX: &str = "RECEITA";
const ROTATIONS: [&str; 4] = ["daily", "hourly", "minutely", "never"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

/// Hosted data API connection
///
/// Leaving `url` unset selects the bundled sample data.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: Option<String>,
    /// Public key for ordinary reads
    pub anon_key: Option<String>,
    /// Elevated key for admin search
    pub service_key: Option<String>,
    pub request_timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            service_key: None,
            request_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period before a parameter change runs a search
    pub debounce_ms: u64,
    pub default_page_size: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            default_page_size: crate::params::DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
    pub file_enabled: bool,
    pub file_directory: String,
    pub file_prefix: String,
    /// daily, hourly, minutely or never
    pub file_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file_enabled: false,
            file_directory: "logs".to_string(),
            file_prefix: "receita".to_string(),
            file_rotation: "daily".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the file and environment.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let file = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => config::File::from(PathBuf::from(path)).required(true),
            Err(_) => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Parse a TOML document on top of the defaults. Environment is ignored.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(url) = self.backend.url() {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "backend.url must be an http(s) URL, got '{url}'"
                )));
            }
            if self.backend.anon_key().is_none() {
                return Err(Error::Config(
                    "backend.anon_key is required when backend.url is set".to_string(),
                ));
            }
        }
        if self.backend.request_timeout_seconds == 0 {
            return Err(Error::Config(
                "backend.request_timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if self.search.default_page_size == 0 {
            return Err(Error::Config(
                "search.default_page_size must be greater than 0".to_string(),
            ));
        }
        if !ROTATIONS.contains(&self.logging.file_rotation.as_str()) {
            return Err(Error::Config(format!(
                "logging.file_rotation must be one of {ROTATIONS:?}, got '{}'",
                self.logging.file_rotation
            )));
        }
        Ok(())
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl BackendConfig {
    pub fn url(&self) -> Option<&str> {
        non_blank(&self.url)
    }

    pub fn anon_key(&self) -> Option<&str> {
        non_blank(&self.anon_key)
    }

    pub fn service_key(&self) -> Option<&str> {
        non_blank(&self.service_key)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Connection for ordinary reads, if a backend is configured.
    pub fn public_options(&self) -> Option<RemoteStoreOptions> {
        let url = self.url()?;
        let key = self.anon_key()?;
        Some(RemoteStoreOptions::new(url, key).with_timeout(self.request_timeout()))
    }

    /// Connection for admin search, if a service key is configured.
    pub fn admin_options(&self) -> Option<RemoteStoreOptions> {
        let url = self.url()?;
        let key = self.service_key()?;
        Some(RemoteStoreOptions::new(url, key).with_timeout(self.request_timeout()))
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
