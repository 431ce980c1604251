//! Upload storage
//!
//! Integration pictures are re-hosted before they are persisted. The
//! repository only depends on [`UploadStorage`]; the backend is chosen from
//! configuration by [`from_config`].

mod local;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::AppConfig;

pub use local::LocalStorage;

/// Errors raised while re-hosting a picture
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unsupported upload source: {0}")]
    UnsupportedSource(String),
    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("fetching {url} returned HTTP {status}")]
    UpstreamStatus { url: String, status: u16 },
    #[error("failed to write upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown storage provider '{0}'")]
    UnknownProvider(String),
}

/// Re-hosts a remote URL or inline payload and returns its canonical URL
#[async_trait]
pub trait UploadStorage: Send + Sync {
    /// Stores the content behind `source` and returns the URL it is now served from
    async fn upload_simple(&self, source: &str) -> Result<String, StorageError>;
}

/// Base URLs that mark a picture as already hosted by us
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PictureUrls {
    /// Root of the CDN bucket uploads are served from
    pub cdn_bucket_url: String,
    /// Root of the public frontend
    pub frontend_url: String,
}

impl PictureUrls {
    pub fn new(cdn_bucket_url: impl Into<String>, frontend_url: impl Into<String>) -> Self {
        Self {
            cdn_bucket_url: cdn_bucket_url.into(),
            frontend_url: frontend_url.into(),
        }
    }

    /// A picture is canonical only when it references both configured roots.
    /// An unset root never matches, so nothing is canonical until both are set.
    pub fn is_canonical(&self, picture: &str) -> bool {
        [&self.cdn_bucket_url, &self.frontend_url]
            .iter()
            .all(|root| !root.is_empty() && picture.contains(root.as_str()))
    }

    /// Public root uploads are served under: the frontend root, proxied
    /// through the CDN bucket when one is configured
    pub fn upload_root(&self) -> String {
        let frontend = self.frontend_url.trim_end_matches('/');
        if self.cdn_bucket_url.is_empty() {
            frontend.to_string()
        } else {
            format!("{}/{}", self.cdn_bucket_url.trim_end_matches('/'), frontend)
        }
    }
}

/// Builds the storage backend selected by `config.storage.provider`
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn UploadStorage>, StorageError> {
    match config.storage.provider.as_str() {
        "local" => {
            let storage = LocalStorage::new(
                &config.storage.upload_directory,
                &config.picture_urls().upload_root(),
                Duration::from_millis(config.storage.fetch_timeout_ms),
            )?;
            Ok(Arc::new(storage))
        }
        other => Err(StorageError::UnknownProvider(other.to_string())),
    }
}
