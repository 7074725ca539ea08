// Playlist and segment fetching: one GET per call, no retry, non-2xx is an error.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response};
use tracing::debug;

use crate::{CheckError, playlist::Playlist};

/// Source of playlist text and segment bytes
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch `url` and decode the body as UTF-8 text
    async fn fetch(&self, url: &str) -> Result<String, CheckError>;

    /// Fetch `url` and return the raw body
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, CheckError>;

    /// Fetch a playlist, keeping its URL for resolving relative URIs
    async fn fetch_playlist(&self, url: &str) -> Result<Playlist, CheckError> {
        let text = self.fetch(url).await?;
        Ok(Playlist::new(url, text))
    }
}

/// HTTP implementation of [`ResourceFetcher`]
#[derive(Debug, Clone)]
pub struct PlaylistFetcher {
    http_client: Client,
}

impl PlaylistFetcher {
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }

    /// Issue the GET and reject non-success statuses
    async fn get(&self, url: &str) -> Result<Response, CheckError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|source| CheckError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ResourceFetcher for PlaylistFetcher {
    async fn fetch(&self, url: &str) -> Result<String, CheckError> {
        let body = self.fetch_bytes(url).await?;
        String::from_utf8(body.to_vec()).map_err(|source| CheckError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, CheckError> {
        let response = self.get(url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|source| CheckError::Network {
                url: url.to_string(),
                source,
            })?;
        debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
