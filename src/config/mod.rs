//! Configuration loading for the integrations service.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `INTEGRATIONS_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::storage::PictureUrls;

const ENV_PREFIX: &str = "INTEGRATIONS_";

/// Application configuration derived from `INTEGRATIONS_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_acquire_timeout_ms")]
    pub db_acquire_timeout_ms: u64,
    /// Root of the CDN bucket re-hosted pictures are served from
    #[serde(default)]
    pub cdn_bucket_url: String,
    /// Public root of the frontend
    #[serde(default)]
    pub frontend_url: String,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Upload storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct StorageConfig {
    /// Backend name (default: "local")
    ///
    /// Environment variable: `INTEGRATIONS_STORAGE_PROVIDER`
    #[serde(default = "default_storage_provider")]
    pub provider: String,

    /// Directory the local backend writes uploads to (default: "uploads")
    ///
    /// Environment variable: `INTEGRATIONS_UPLOAD_DIRECTORY`
    #[serde(default = "default_upload_directory")]
    pub upload_directory: String,

    /// Timeout for downloading a remote picture in milliseconds (default: 10000)
    ///
    /// Environment variable: `INTEGRATIONS_UPLOAD_FETCH_TIMEOUT_MS`
    #[serde(default = "default_upload_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_storage_provider(),
            upload_directory: default_upload_directory(),
            fetch_timeout_ms: default_upload_fetch_timeout_ms(),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !KNOWN_STORAGE_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(ConfigError::UnknownStorageProvider {
                value: self.provider.clone(),
            });
        }

        if self.upload_directory.trim().is_empty() {
            return Err(ConfigError::EmptyUploadDirectory);
        }

        if self.fetch_timeout_ms == 0 {
            return Err(ConfigError::InvalidUploadFetchTimeout {
                value: self.fetch_timeout_ms,
            });
        }

        Ok(())
    }
}

const KNOWN_STORAGE_PROVIDERS: &[&str] = &["local"];

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            database_url: default_database_url(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_ms: default_db_acquire_timeout_ms(),
            cdn_bucket_url: String::new(),
            frontend_url: String::new(),
            storage: StorageConfig::default(),
        }
    }
}

impl AppConfig {
    /// Base URLs used to decide whether a picture is already re-hosted
    pub fn picture_urls(&self) -> PictureUrls {
        PictureUrls::new(self.cdn_bucket_url.clone(), self.frontend_url.clone())
    }

    /// Returns a redacted JSON representation (database credentials are redacted).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        if let Ok(mut url) = Url::parse(&config.database_url)
            && url.password().is_some()
        {
            let _ = url.set_password(Some("[REDACTED]"));
            config.database_url = url.to_string();
        }
        serde_json::to_string_pretty(&config)
    }

    /// Validates the configuration, returning an error if required settings are missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections {
                value: self.db_max_connections,
            });
        }

        // Outside local/test the frontend root must be known so uploads get public URLs
        if !matches!(self.profile.as_str(), "local" | "test") && self.frontend_url.is_empty() {
            return Err(ConfigError::MissingFrontendUrl);
        }

        for (field, value) in [
            ("FRONTEND_URL", &self.frontend_url),
            ("CDN_BUCKET_URL", &self.cdn_bucket_url),
        ] {
            if !value.is_empty() && Url::parse(value).is_err() {
                return Err(ConfigError::InvalidUrl {
                    field,
                    value: value.clone(),
                });
            }
        }

        if !matches!(self.log_format.as_str(), "json" | "pretty") {
            return Err(ConfigError::InvalidLogFormat {
                value: self.log_format.clone(),
            });
        }

        self.storage.validate()?;

        Ok(())
    }
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_database_url() -> String {
    "postgresql://localhost:5432/integrations".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_acquire_timeout_ms() -> u64 {
    5000
}

fn default_storage_provider() -> String {
    "local".to_string()
}

fn default_upload_directory() -> String {
    "uploads".to_string()
}

fn default_upload_fetch_timeout_ms() -> u64 {
    10_000
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("database URL is missing; set INTEGRATIONS_DATABASE_URL")]
    MissingDatabaseUrl,
    #[error("database pool size must be positive, got {value}")]
    InvalidMaxConnections { value: u32 },
    #[error("frontend URL is missing; set INTEGRATIONS_FRONTEND_URL")]
    MissingFrontendUrl,
    #[error("{field} is not a valid URL: '{value}'")]
    InvalidUrl { field: &'static str, value: String },
    #[error("log format must be 'json' or 'pretty', got '{value}'")]
    InvalidLogFormat { value: String },
    #[error("unknown storage provider '{value}'")]
    UnknownStorageProvider { value: String },
    #[error("upload directory cannot be empty")]
    EmptyUploadDirectory,
    #[error("upload fetch timeout must be positive, got {value}")]
    InvalidUploadFetchTimeout { value: u64 },
}

/// Loads configuration using layered `.env` files and `INTEGRATIONS_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads and validates configuration; process environment wins over every file.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layered.insert(stripped.to_string(), value);
            }
        }

        let profile = take_non_empty(&mut layered, "PROFILE").unwrap_or(profile_hint);
        let log_level = take_non_empty(&mut layered, "LOG_LEVEL").unwrap_or_else(default_log_level);
        let log_format =
            take_non_empty(&mut layered, "LOG_FORMAT").unwrap_or_else(default_log_format);
        let database_url =
            take_non_empty(&mut layered, "DATABASE_URL").unwrap_or_else(default_database_url);
        let db_max_connections = layered
            .remove("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_max_connections);
        let db_acquire_timeout_ms = layered
            .remove("DB_ACQUIRE_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_acquire_timeout_ms);

        let cdn_bucket_url = take_non_empty(&mut layered, "CDN_BUCKET_URL").unwrap_or_default();
        let frontend_url = take_non_empty(&mut layered, "FRONTEND_URL").unwrap_or_default();

        let storage = StorageConfig {
            provider: take_non_empty(&mut layered, "STORAGE_PROVIDER")
                .unwrap_or_else(default_storage_provider),
            upload_directory: take_non_empty(&mut layered, "UPLOAD_DIRECTORY")
                .unwrap_or_else(default_upload_directory),
            fetch_timeout_ms: layered
                .remove("UPLOAD_FETCH_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_upload_fetch_timeout_ms),
        };

        let config = AppConfig {
            profile,
            log_level,
            log_format,
            database_url,
            db_max_connections,
            db_acquire_timeout_ms,
            cdn_bucket_url,
            frontend_url,
            storage,
        };

        config.validate()?;
        Ok(config)
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var(format!("{ENV_PREFIX}PROFILE"))
            .ok()
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn take_non_empty(values: &mut BTreeMap<String, String>, key: &str) -> Option<String> {
    values
        .remove(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
