use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, FetchError, Result};
use crate::models::{NetworkVideo, NetworkVideoContainer};

/// Anything that can hand back the current remote playlist.
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    async fn fetch_playlist(&self) -> std::result::Result<Vec<NetworkVideo>, FetchError>;
}

pub struct PlaylistFetcher {
    client: Client,
    playlist_url: String,
}

impl PlaylistFetcher {
    pub fn new(playlist_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("devbytes-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Other(anyhow::anyhow!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            playlist_url: playlist_url.into(),
        })
    }
}

#[async_trait]
impl PlaylistSource for PlaylistFetcher {
    async fn fetch_playlist(&self) -> std::result::Result<Vec<NetworkVideo>, FetchError> {
        let response = self.client.get(&self.playlist_url).send().await?;

        if !response.status().is_success() {
            tracing::debug!("Failed to fetch {}: {}", self.playlist_url, response.status());
            return Err(FetchError::Status(response.status()));
        }

        let container: NetworkVideoContainer = response.json().await?;
        tracing::debug!(
            "Fetched {} videos from {}",
            container.videos.len(),
            self.playlist_url
        );
        Ok(container.videos)
    }
}
