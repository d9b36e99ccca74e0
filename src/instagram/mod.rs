//! # Instagram Integration Module
//!
//! Reads the artist's profile and media through the Instagram Graph API and
//! runs the OAuth authorization-code flow that produces the long-lived user
//! token those reads require.
//!
//! ## Token lifecycle
//!
//! At startup the client is seeded with `INSTAGRAM_ACCESS_TOKEN`, if set. Its
//! expiry is unknown, so it is treated as valid until the API rejects it.
//! Completing the OAuth flow, or refreshing, replaces the held token with one
//! whose expiry is known. The token only lives in process memory: a restart
//! falls back to the environment value.
//!
//! ```text
//! GET /api/instagram/auth      → authorize URL with a random `state`
//!          ↓ (user consents on instagram.com)
//! GET /api/instagram/callback  → state check
//!                              → code → short-lived token
//!                              → short-lived → long-lived token
//!                              → cache cleared
//! ```
//!
//! ## Cache keys
//!
//! | Operation | Key | TTL |
//! |---|---|---|
//! | profile | `instagram:profile` | 24 hours |
//! | raw media | `instagram:media:{limit}` | 1 hour |
//! | gallery | `instagram:gallery` | 5 minutes |
//! | single post | `instagram:post:{id}` | 24 hours |

pub mod auth;
pub mod media;

use std::{collections::VecDeque, sync::Arc};

use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::info;

use crate::{
    config::InstagramConfig,
    error::{Provider, ProviderError, Result},
    management::{Clock, ExpiringCache, SystemClock, cache_key},
    types::InstagramToken,
};

/// Graph API version prefixed to every media path.
pub const GRAPH_API_VERSION: &str = "v13.0";

pub struct InstagramClient {
    http: Client,
    config: InstagramConfig,
    clock: Arc<dyn Clock>,
    token: Mutex<Option<InstagramToken>>,
    /// OAuth `state` values handed out and not yet redeemed, oldest first.
    pending_states: Mutex<VecDeque<auth::PendingState>>,
    cache: ExpiringCache,
}

impl InstagramClient {
    pub fn new(http: Client, config: InstagramConfig) -> Self {
        Self::with_clock(http, config, Arc::new(SystemClock))
    }

    pub fn with_clock(http: Client, config: InstagramConfig, clock: Arc<dyn Clock>) -> Self {
        let token = config.access_token.clone().map(|access_token| InstagramToken {
            access_token,
            expires_at: None,
        });

        Self {
            http,
            config,
            token: Mutex::new(token),
            pending_states: Mutex::new(VecDeque::new()),
            cache: ExpiringCache::with_clock(Arc::clone(&clock)),
            clock,
        }
    }

    /// Whether the app id and secret needed for OAuth are set.
    pub fn is_configured(&self) -> bool {
        self.config.app_id.is_some() && self.config.app_secret.is_some()
    }

    /// Drops every cached Instagram response.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
        info!("Instagram cache cleared");
    }

    fn key(&self, operation: &str, params: &[&str]) -> String {
        cache_key(Provider::Instagram.key_prefix(), operation, params)
    }

    /// Returns the held token if it has not expired.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::MissingCredentials`] when no token was ever obtained
    /// - [`ProviderError::Authorization`] when the held token has expired
    async fn access_token(&self) -> Result<String> {
        let held = self.token.lock().await;
        let token = held
            .as_ref()
            .ok_or(ProviderError::MissingCredentials("INSTAGRAM_ACCESS_TOKEN"))?;

        if !token.is_valid_at(self.clock.now()) {
            return Err(ProviderError::Authorization(
                "Instagram access token has expired".into(),
            ));
        }

        Ok(token.access_token.clone())
    }

    /// Sends an authenticated GET to `{graph_url}/v13.0{path}`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let token = self.access_token().await?;
        let url = format!("{}/{}{}", self.config.graph_url, GRAPH_API_VERSION, path);

        let response = self
            .http
            .get(url)
            .query(query)
            .query(&[("access_token", token.as_str())])
            .send()
            .await?;

        let response = ProviderError::check(Provider::Instagram, response).await?;
        Ok(response.json::<T>().await?)
    }
}
