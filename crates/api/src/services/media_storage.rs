//! Object storage adapters for uploaded photos.
//!
//! Objects are addressed by a relative path such as
//! `{owner_id}/{uuid}.jpg`. The returned URL is stored verbatim in site
//! content, so it must stay valid for as long as the object exists.

use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;

use crate::config::{MediaBackend, MediaConfig};
use domain::stores::ObjectStorage;
use domain::StorageError;

/// An accepted image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageKind {
    pub content_type: &'static str,
    pub extension: &'static str,
}

/// Detects JPEG, PNG, GIF and WebP from their magic bytes.
///
/// The client-declared content type is never trusted.
pub fn detect_image(bytes: &[u8]) -> Option<ImageKind> {
    let kind = |content_type, extension| {
        Some(ImageKind {
            content_type,
            extension,
        })
    };
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => kind("image/jpeg", "jpg"),
        [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, ..] => kind("image/png", "png"),
        [0x47, 0x49, 0x46, 0x38, ..] => kind("image/gif", "gif"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => {
            kind("image/webp", "webp")
        }
        _ => None,
    }
}

/// Rejects absolute paths, empty paths and any `.`/`..` component.
pub fn validate_object_path(path: &str) -> Result<(), StorageError> {
    let bad_segment = path
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if bad_segment || path.contains('\\') {
        return Err(StorageError::Rejected(format!(
            "invalid object path '{}'",
            path
        )));
    }
    Ok(())
}

/// Writes objects under a local directory served by this process.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
    public_path: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, public_path: &str) -> Self {
        Self {
            root: root.into(),
            public_path: public_path.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        validate_object_path(path)?;
        let target = self.root.join(path);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::Unavailable(format!("create {}: {}", parent.display(), e))
            })?;
        }
        fs::write(&target, &bytes)
            .await
            .map_err(|e| StorageError::Unavailable(format!("write {}: {}", target.display(), e)))?;

        tracing::debug!(
            path = %path,
            content_type = %content_type,
            size = bytes.len(),
            "Stored object on local disk"
        );
        Ok(format!("{}/{}", self.public_path, path))
    }
}

/// PUTs objects to an HTTP object store (S3-compatible gateways, CDNs).
#[derive(Debug, Clone)]
pub struct HttpObjectStorage {
    client: Client,
    endpoint: String,
    auth_token: Option<String>,
    public_base_url: String,
}

impl HttpObjectStorage {
    pub fn new(config: &MediaConfig) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StorageError::Unavailable(format!("http client: {}", e)))?;

        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        let public_base_url = if config.public_base_url.is_empty() {
            endpoint.clone()
        } else {
            config.public_base_url.trim_end_matches('/').to_string()
        };

        Ok(Self {
            client,
            endpoint,
            auth_token: Some(config.auth_token.clone()).filter(|t| !t.is_empty()),
            public_base_url,
        })
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        validate_object_path(path)?;
        let url = format!("{}/{}", self.endpoint, path);

        let mut request = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(format!("PUT {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(url = %url, status = %status, body = %body, "Object store refused upload");
            return Err(if status.is_client_error() {
                StorageError::Rejected(format!("object store returned {}", status))
            } else {
                StorageError::Unavailable(format!("object store returned {}", status))
            });
        }

        Ok(format!("{}/{}", self.public_base_url, path))
    }
}

/// Builds the configured storage adapter.
pub fn build_object_storage(config: &MediaConfig) -> Result<Arc<dyn ObjectStorage>, StorageError> {
    match config.backend {
        MediaBackend::Local => Ok(Arc::new(LocalObjectStorage::new(
            &config.upload_dir,
            &config.public_path,
        ))),
        MediaBackend::Http => Ok(Arc::new(HttpObjectStorage::new(config)?)),
    }
}
