//! REST client for the object storage service.

use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

use crate::url::{download_url, storage_path_from_download_url};

/// Default object storage REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://firebasestorage.googleapis.com/v0";

/// Upload body chunk size; progress is reported once per chunk.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Errors from the storage helper.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The storage service returned a non-2xx status code.
    #[error("Storage API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The URL does not have the `.../o/<path>?...` shape.
    #[error("Not a storage download URL: {0}")]
    InvalidDownloadUrl(String),

    /// The upload succeeded but the service returned no download token.
    #[error("No download token returned for {path}")]
    MissingDownloadToken { path: String },
}

/// Where and how to reach the storage bucket.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub base_url: String,
    pub bucket: String,
    /// Bearer token sent with every request, if the bucket requires one.
    pub auth_token: Option<String>,
}

impl StorageConfig {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            bucket: bucket.into(),
            auth_token: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

/// Object metadata returned by an upload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    /// Comma-separated list; the first token is used in download URLs.
    download_tokens: Option<String>,
}

/// HTTP client for a single storage bucket.
pub struct StorageClient {
    client: reqwest::Client,
    config: StorageConfig,
}

impl StorageClient {
    pub fn new(config: StorageConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Reuse an existing [`reqwest::Client`] (shares its connection pool).
    pub fn with_client(client: reqwest::Client, config: StorageConfig) -> Self {
        Self { client, config }
    }

    /// Upload `data` to `path` and return its public download URL.
    ///
    /// `on_progress` receives the integer percentage sent so far
    /// (`floor(sent / total * 100)`) as each chunk is handed to the
    /// connection. Any failure is returned to the caller.
    pub async fn upload_file<F>(
        &self,
        data: Vec<u8>,
        path: &str,
        content_type: &str,
        mut on_progress: F,
    ) -> Result<String, StorageError>
    where
        F: FnMut(u8) + Send + Sync + 'static,
    {
        let total = data.len();
        // An empty body has no chunks to report on.
        if total == 0 {
            on_progress(100);
        }
        let chunks: Vec<Vec<u8>> = data.chunks(UPLOAD_CHUNK_SIZE).map(<[u8]>::to_vec).collect();

        let mut sent = 0usize;
        let body = futures::stream::iter(chunks).map(move |chunk| {
            sent += chunk.len();
            on_progress(progress_percent(sent, total));
            Ok::<_, std::io::Error>(chunk)
        });

        let mut request = self
            .client
            .post(format!(
                "{}/b/{}/o",
                self.config.base_url, self.config.bucket
            ))
            .query(&[("uploadType", "media"), ("name", path)])
            .header(CONTENT_TYPE, content_type)
            .body(reqwest::Body::wrap_stream(body));
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = Self::ensure_success(request.send().await?).await?;
        let metadata: ObjectMetadata = response.json().await?;

        let token = metadata
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| StorageError::MissingDownloadToken {
                path: metadata.name.clone(),
            })?;

        tracing::debug!(path = %metadata.name, bytes = total, "Upload complete");

        Ok(download_url(
            &self.config.base_url,
            &self.config.bucket,
            &metadata.name,
            token,
        ))
    }

    /// Delete the object a download URL points at.
    pub async fn delete_file(&self, download_url: &str) -> Result<(), StorageError> {
        let path = storage_path_from_download_url(download_url)?;

        let mut request = self.client.delete(format!(
            "{}/b/{}/o/{}",
            self.config.base_url,
            self.config.bucket,
            urlencoding::encode(&path)
        ));
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        Self::ensure_success(request.send().await?).await?;
        tracing::debug!(path = %path, "Object deleted");
        Ok(())
    }

    // ---- private helpers ----

    /// Return the response unchanged on success, or an
    /// [`StorageError::Api`] carrying the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StorageError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Integer percentage of `sent` over `total`, rounded down.
pub fn progress_percent(sent: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (sent.min(total) as u128 * 100) / total as u128;
    pct as u8
}
