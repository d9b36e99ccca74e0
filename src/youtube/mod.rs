//! # YouTube Integration Module
//!
//! Lists and looks up videos of the artist's channel through the YouTube
//! Data API v3. Requests are authenticated with an API key sent as the `key`
//! query parameter; there is no token lifecycle.
//!
//! Search results carry no duration or view count, so every listing is
//! followed by one batched `videos` call for all returned ids. If that call
//! fails the listing is still served, with `0:00` and `0` as placeholders.
//!
//! ## Cache keys
//!
//! | Operation | Key | TTL |
//! |---|---|---|
//! | channel videos | `youtube:videos` | 1 hour |
//! | featured video | `youtube:featured` | 1 hour |
//! | single video | `youtube:video:{id}` | 24 hours |
//! | search | `youtube:search:{query}` | 5 minutes |

pub mod videos;

use std::sync::Arc;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::{
    config::YouTubeConfig,
    error::{Provider, ProviderError, Result},
    management::{Clock, ExpiringCache, SystemClock, cache_key},
};

pub struct YouTubeClient {
    http: Client,
    config: YouTubeConfig,
    cache: ExpiringCache,
}

impl YouTubeClient {
    pub fn new(http: Client, config: YouTubeConfig) -> Self {
        Self::with_clock(http, config, Arc::new(SystemClock))
    }

    pub fn with_clock(http: Client, config: YouTubeConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            http,
            config,
            cache: ExpiringCache::with_clock(clock),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Drops every cached YouTube response.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
        info!("YouTube cache cleared");
    }

    /// Checks that the Data API accepts the configured key.
    ///
    /// Looks up the channel id only, which is the cheapest call in quota
    /// units, and bypasses the cache.
    pub async fn probe(&self) -> Result<()> {
        self.get_json::<serde_json::Value>(
            "channels",
            &[("part", "id"), ("id", self.config.channel_id.as_str())],
        )
        .await
        .map(|_| ())
    }

    fn key(&self, operation: &str, params: &[&str]) -> String {
        cache_key(Provider::YouTube.key_prefix(), operation, params)
    }

    /// Sends a GET to `{api_url}/{endpoint}` with the API key and `params`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredentials("YOUTUBE_API_KEY"))?;

        let response = self
            .http
            .get(format!("{}/{}", self.config.api_url, endpoint))
            .query(&[("key", api_key)])
            .query(params)
            .send()
            .await?;

        let response = ProviderError::check(Provider::YouTube, response).await?;
        Ok(response.json::<T>().await?)
    }
}
