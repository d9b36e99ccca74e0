//! # Spotify Integration Module
//!
//! Read-only access to the artist's Spotify catalog: top tracks, albums,
//! single tracks, the artist profile and a track search. Every read goes
//! through the client's [`ExpiringCache`] and authenticates with a
//! client-credentials token held by a [`TokenManager`].
//!
//! ## Architecture
//!
//! ```text
//! Route handlers (crate::api::spotify)
//!          ↓
//! SpotifyClient
//!     ├── ExpiringCache   (spotify:* keys)
//!     ├── TokenManager    (client-credentials token)
//!     └── transforms      (payload → Track / Album / Artist)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Authentication
//!
//! [`auth`] performs the client-credentials exchange. The token manager
//! refreshes proactively one minute before the token expires. If an API call
//! still answers 401, the token is dropped and the call is repeated exactly
//! once with a fresh token; a second 401 is returned to the caller.
//!
//! ## Cache keys
//!
//! | Operation | Key | TTL |
//! |---|---|---|
//! | featured track | `spotify:featured-track` | 1 hour |
//! | popular tracks | `spotify:popular-tracks` | 5 minutes |
//! | albums | `spotify:albums` | 24 hours |
//! | track | `spotify:track:{id}` | 24 hours |
//! | artist profile | `spotify:artist:{id}` | 24 hours |
//! | search | `spotify:search:{query}` | 5 minutes |

pub mod albums;
pub mod artists;
pub mod auth;
pub mod tracks;

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::{
    config::SpotifyConfig,
    error::{Provider, ProviderError, Result},
    management::{Clock, ExpiringCache, SystemClock, TokenManager, cache_key},
    types::ClientCredentials,
};

/// Whether a request has already been repeated after a 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Fresh,
    Retried,
}

pub struct SpotifyClient {
    http: Client,
    config: SpotifyConfig,
    tokens: TokenManager,
    cache: ExpiringCache,
}

impl SpotifyClient {
    pub fn new(http: Client, config: SpotifyConfig) -> Self {
        Self::with_clock(http, config, Arc::new(SystemClock))
    }

    pub fn with_clock(http: Client, config: SpotifyConfig, clock: Arc<dyn Clock>) -> Self {
        let credentials = match (&config.client_id, &config.client_secret) {
            (Some(id), Some(secret)) => Some(ClientCredentials {
                client_id: id.clone(),
                client_secret: secret.clone(),
            }),
            _ => None,
        };

        let tokens = TokenManager::with_clock(
            http.clone(),
            config.token_url.clone(),
            credentials,
            Arc::clone(&clock),
        );

        Self {
            http,
            config,
            tokens,
            cache: ExpiringCache::with_clock(clock),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.client_id.is_some() && self.config.client_secret.is_some()
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Drops every cached Spotify response.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    fn key(&self, operation: &str, params: &[&str]) -> String {
        cache_key(Provider::Spotify.key_prefix(), operation, params)
    }

    /// Sends an authenticated GET to `{api_url}{path}` and decodes the body.
    ///
    /// A 401 invalidates the held token and repeats the request once. Any
    /// other non-2xx status, or a second 401, is returned as
    /// [`ProviderError::Upstream`].
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.config.api_url, path);
        let mut attempt = Attempt::Fresh;

        loop {
            let token = self.tokens.get_valid_token().await?;
            let response = self
                .http
                .get(&url)
                .query(query)
                .bearer_auth(&token)
                .send()
                .await?;

            if response.status() == StatusCode::UNAUTHORIZED && attempt == Attempt::Fresh {
                warn!(path, "Spotify rejected the access token, retrying with a new one");
                self.tokens.invalidate().await;
                attempt = Attempt::Retried;
                continue;
            }

            let response = ProviderError::check(Provider::Spotify, response).await?;
            return Ok(response.json::<T>().await?);
        }
    }
}
