//! Image upload to Firebase Storage.
//!
//! Callers never depend on an upload succeeding: when storage is not
//! configured, or the upload fails, they keep a placeholder (or the previous
//! image) and tell the user.

use std::future::Future;
use std::pin::Pin;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use crate::config::StorageConfig;

/// Firebase Storage REST base URL.
const BASE_URL: &str = "https://firebasestorage.googleapis.com/v0/b";

/// Storage prefix for listing images.
pub const PRODUCT_IMAGES_PREFIX: &str = "product_images";

/// Storage prefix for profile pictures.
pub const PROFILE_PICTURES_PREFIX: &str = "profile_pictures";

/// Errors that can occur when uploading an image.
#[derive(Debug, Error)]
pub enum UploadError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Storage returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// An image selected by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name (e.g., "carrots.jpg").
    pub file_name: String,
    /// MIME type (e.g., "image/jpeg").
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Object path for an upload: `{prefix}/{owner_id}/{unix_millis}-{file_name}`.
#[must_use]
pub fn object_path(prefix: &str, owner_id: &str, file_name: &str) -> String {
    format!(
        "{prefix}/{owner_id}/{}-{file_name}",
        Utc::now().timestamp_millis()
    )
}

/// Future returned by [`ImageUploader::upload`].
pub type UploadFuture<'a> = Pin<Box<dyn Future<Output = Result<String, UploadError>> + Send + 'a>>;

/// Stores an image and returns its public URL.
pub trait ImageUploader: Send + Sync {
    /// Upload `image` to `path`, returning a URL that serves it.
    fn upload<'a>(&'a self, path: &'a str, image: &'a ImageUpload) -> UploadFuture<'a>;
}

/// Firebase Storage client.
#[derive(Clone)]
pub struct FirebaseStorageClient {
    client: reqwest::Client,
    bucket: String,
    api_key: SecretString,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

impl FirebaseStorageClient {
    /// Create a new client for the configured bucket.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorageConfig) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            bucket: config.storage_bucket.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Upload an object and build its download URL.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response lacks a download token.
    pub async fn upload_object(
        &self,
        path: &str,
        image: &ImageUpload,
    ) -> Result<String, UploadError> {
        let url = format!(
            "{BASE_URL}/{}/o?name={}&key={}",
            self.bucket,
            urlencoding::encode(path),
            urlencoding::encode(self.api_key.expose_secret())
        );

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, &image.content_type)
            .body(image.bytes.clone())
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UploadError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let metadata: ObjectMetadata = response
            .json()
            .await
            .map_err(|e| UploadError::Parse(e.to_string()))?;

        let token = metadata
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| UploadError::Parse("missing download token".to_string()))?;

        tracing::debug!(object = %metadata.name, "Image uploaded");
        Ok(self.download_url(&metadata.name, token))
    }

    fn download_url(&self, object_name: &str, token: &str) -> String {
        format!(
            "{BASE_URL}/{}/o/{}?alt=media&token={token}",
            self.bucket,
            urlencoding::encode(object_name)
        )
    }
}

impl ImageUploader for FirebaseStorageClient {
    fn upload<'a>(&'a self, path: &'a str, image: &'a ImageUpload) -> UploadFuture<'a> {
        Box::pin(self.upload_object(path, image))
    }
}

impl std::fmt::Debug for FirebaseStorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseStorageClient")
            .field("bucket", &self.bucket)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
