//! Local disk storage
//!
//! Downloads (or decodes) the source and writes it below the upload
//! directory, which the frontend serves under `/uploads` (optionally behind
//! the CDN bucket, see [`super::PictureUrls::upload_root`]).

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use chrono::Utc;
use tracing::debug;
use url::Url;

use super::{StorageError, UploadStorage};
use crate::ids::make_id;

const FILE_NAME_LEN: usize = 32;

/// Storage backend writing uploads to a local directory
#[derive(Debug, Clone)]
pub struct LocalStorage {
    client: reqwest::Client,
    upload_directory: PathBuf,
    /// Public root the upload directory is served from
    public_base_url: String,
}

impl LocalStorage {
    /// Creates a new LocalStorage
    ///
    /// # Arguments
    ///
    /// * `upload_directory` - Directory uploads are written to
    /// * `public_base_url` - Public upload root; files are served from `<root>/uploads/...`
    /// * `fetch_timeout` - Upper bound for downloading a remote source
    pub fn new(
        upload_directory: impl AsRef<Path>,
        public_base_url: &str,
        fetch_timeout: Duration,
    ) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .map_err(StorageError::Client)?;

        Ok(Self {
            client,
            upload_directory: upload_directory.as_ref().to_path_buf(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, url: Url) -> Result<(Vec<u8>, Option<String>), StorageError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| StorageError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::UpstreamStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|source| StorageError::Fetch {
                url: url.to_string(),
                source,
            })?;

        Ok((bytes.to_vec(), content_type))
    }

    async fn load(&self, source: &str) -> Result<(Vec<u8>, Option<String>), StorageError> {
        if source.starts_with("data:") {
            let (bytes, mime) = decode_data_uri(source)?;
            return Ok((bytes, Some(mime)));
        }

        let url = Url::parse(source)
            .map_err(|_| StorageError::UnsupportedSource(source.to_string()))?;
        match url.scheme() {
            "http" | "https" => self.fetch(url).await,
            _ => Err(StorageError::UnsupportedSource(source.to_string())),
        }
    }
}

#[async_trait]
impl UploadStorage for LocalStorage {
    async fn upload_simple(&self, source: &str) -> Result<String, StorageError> {
        let (bytes, content_type) = self.load(source).await?;
        let extension = file_extension(content_type.as_deref(), source);

        let day = Utc::now().format("%Y/%m/%d").to_string();
        let file_name = format!("{}.{}", make_id(FILE_NAME_LEN), extension);

        let directory = self.upload_directory.join(&day);
        tokio::fs::create_dir_all(&directory).await?;
        let path = directory.join(&file_name);
        tokio::fs::write(&path, &bytes).await?;

        debug!(
            path = %path.display(),
            bytes = bytes.len(),
            "Stored upload on local disk"
        );

        Ok(format!("{}/uploads/{}/{}", self.public_base_url, day, file_name))
    }
}

/// Splits a `data:<mime>;base64,<payload>` URI into bytes and mime type
fn decode_data_uri(uri: &str) -> Result<(Vec<u8>, String), StorageError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| StorageError::InvalidDataUri("missing data: prefix".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| StorageError::InvalidDataUri("missing payload separator".to_string()))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| StorageError::InvalidDataUri("only base64 payloads are supported".to_string()))?;

    let bytes = general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| StorageError::InvalidDataUri(e.to_string()))?;

    let mime = if mime.is_empty() {
        "application/octet-stream"
    } else {
        mime
    };

    Ok((bytes, mime.to_string()))
}

/// Picks a file extension from the content type, falling back to the source path
fn file_extension(content_type: Option<&str>, source: &str) -> String {
    let essence = content_type
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase());

    let known = match essence.as_deref() {
        Some("image/jpeg") | Some("image/jpg") => Some("jpg"),
        Some("image/png") => Some("png"),
        Some("image/webp") => Some("webp"),
        Some("image/gif") => Some("gif"),
        Some("image/svg+xml") => Some("svg"),
        Some("video/mp4") => Some("mp4"),
        _ => None,
    };
    if let Some(extension) = known {
        return extension.to_string();
    }

    Url::parse(source)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .and_then(|last| {
            last.rsplit_once('.')
                .map(|(_, extension)| extension.to_ascii_lowercase())
        })
        .filter(|extension| {
            !extension.is_empty()
                && extension.len() <= 5
                && extension.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| "bin".to_string())
}
