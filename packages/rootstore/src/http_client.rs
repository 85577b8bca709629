//! HTTP client for vendor artifact downloads

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::io::AsyncWriteExt;

use crate::error::{Result, RootStoreError};

/// Source of raw vendor artifacts.
///
/// Non-success statuses surface as [`RootStoreError::HttpStatus`] and
/// failures to obtain a response as [`RootStoreError::Transport`], so callers
/// can tell retryable failures apart with [`RootStoreError::is_retryable`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and return the full body
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// GET `url` and write the body to `path`, replacing any existing file
    async fn fetch_to_file(&self, url: &str, path: &Path) -> Result<u64> {
        let body = self.fetch(url).await?;
        tokio::fs::write(path, &body).await?;
        Ok(body.len() as u64)
    }
}

/// `reqwest`-backed [`Fetcher`]
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - HTTP client initialization fails
    /// - System TLS configuration is invalid
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("rootstore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RootStoreError::HttpClientInit {
                source: Box::new(e),
                context: "Failed to initialize HTTP client for root store downloads",
            })?;

        Ok(Self { client })
    }

    /// Wrap an existing client
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport(url, &e))?;

        if !response.status().is_success() {
            return Err(RootStoreError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET {}", url);
        let response = self.get(url).await?;

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| transport(url, &e))
    }

    async fn fetch_to_file(&self, url: &str, path: &Path) -> Result<u64> {
        tracing::debug!("GET {} -> {}", url, path.display());
        let response = self.get(url).await?;

        let file = tokio::fs::File::create(path).await?;
        match stream_body(url, response, file).await {
            Ok(written) => Ok(written),
            Err(e) => {
                let _ = tokio::fs::remove_file(path).await;
                Err(e)
            }
        }
    }
}

async fn stream_body(
    url: &str,
    mut response: reqwest::Response,
    mut file: tokio::fs::File,
) -> Result<u64> {
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await.map_err(|e| transport(url, &e))? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(written)
}

fn transport(url: &str, err: &reqwest::Error) -> RootStoreError {
    RootStoreError::Transport {
        url: url.to_string(),
        message: err.to_string(),
    }
}
