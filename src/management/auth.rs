use std::sync::Arc;

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::info;

use crate::{
    error::{Provider, ProviderError, Result},
    management::clock::{Clock, SystemClock},
    spotify,
    types::{AccessToken, ClientCredentials},
};

/// Holds the Spotify client-credentials token and refreshes it on expiry.
///
/// The token is kept for one process only. It is replaced wholesale on every
/// refresh; [`TokenManager::invalidate`] drops it after the API rejected it.
pub struct TokenManager {
    http: Client,
    token_url: String,
    credentials: Option<ClientCredentials>,
    clock: Arc<dyn Clock>,
    token: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    pub fn new(http: Client, token_url: String, credentials: Option<ClientCredentials>) -> Self {
        Self::with_clock(http, token_url, credentials, Arc::new(SystemClock))
    }

    pub fn with_clock(
        http: Client,
        token_url: String,
        credentials: Option<ClientCredentials>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        TokenManager {
            http,
            token_url,
            credentials,
            clock,
            token: Mutex::new(None),
        }
    }

    /// Returns a token that is valid right now, requesting a new one if the
    /// held token is missing or past its safety margin.
    ///
    /// The lock stays held during the exchange so concurrent callers wait for
    /// the same refresh instead of each starting one.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::MissingCredentials`] without client id and secret
    /// - [`ProviderError::Upstream`] when the token endpoint rejects the grant
    /// - [`ProviderError::Malformed`] when the granted lifetime is out of range
    pub async fn get_valid_token(&self) -> Result<String> {
        let mut held = self.token.lock().await;
        let now = self.clock.now();

        if let Some(token) = held.as_ref().filter(|t| t.is_valid_at(now)) {
            return Ok(token.token.clone());
        }

        let credentials = self
            .credentials
            .as_ref()
            .ok_or(ProviderError::MissingCredentials(
                "SPOTIFY_CLIENT_ID/SPOTIFY_CLIENT_SECRET",
            ))?;

        let response =
            spotify::auth::request_client_credentials(&self.http, &self.token_url, credentials)
                .await?;
        let token = AccessToken::issued(response.access_token, response.expires_in, now)
            .ok_or_else(|| {
                ProviderError::malformed(
                    Provider::Spotify,
                    format!("token lifetime out of range: {}", response.expires_in),
                )
            })?;
        info!(expires_at = %token.expires_at, "acquired Spotify access token");

        let value = token.token.clone();
        *held = Some(token);
        Ok(value)
    }

    /// Forgets the held token so the next call performs a fresh exchange.
    pub async fn invalidate(&self) {
        *self.token.lock().await = None;
    }

    pub async fn current_token(&self) -> Option<AccessToken> {
        self.token.lock().await.clone()
    }
}
