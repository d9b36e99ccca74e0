use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use reqwest::Url;
use tracing::{info, warn};

use crate::{
    error::{Provider, ProviderError, Result},
    types::{
        InstagramAuthStatus, InstagramToken, LongLivedTokenResponse, ShortLivedTokenResponse,
    },
    utils::generate_state,
};

use super::InstagramClient;

const OAUTH_SCOPE: &str = "user_profile,user_media";

/// Upper bound on outstanding authorization attempts. Once reached, new
/// attempts are refused until older ones are redeemed or expire.
const MAX_PENDING_STATES: usize = 16;

/// How long a handed-out `state` can be redeemed.
const STATE_TTL_MINUTES: i64 = 10;

/// An OAuth `state` handed out and not yet redeemed.
pub(super) struct PendingState {
    state: String,
    issued_at: DateTime<Utc>,
}

impl InstagramClient {
    /// Builds the Instagram consent URL the admin is sent to.
    ///
    /// A fresh random `state` is embedded in the URL and remembered until
    /// the callback redeems it or it is older than ten minutes.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::MissingCredentials`] when `INSTAGRAM_APP_ID` is unset
    /// - [`ProviderError::Authorization`] while too many attempts are pending
    pub async fn authorization_url(&self) -> Result<String> {
        let app_id = self
            .config
            .app_id
            .as_deref()
            .ok_or(ProviderError::MissingCredentials("INSTAGRAM_APP_ID"))?;

        let state = generate_state();
        let url = Url::parse_with_params(
            &format!("{}/oauth/authorize", self.config.oauth_url),
            &[
                ("client_id", app_id),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", OAUTH_SCOPE),
                ("response_type", "code"),
                ("state", state.as_str()),
            ],
        )
        .map_err(|e| ProviderError::Authorization(format!("invalid OAuth URL: {e}")))?;

        let now = self.clock.now();
        let mut pending = self.pending_states.lock().await;
        prune_expired(&mut pending, now);
        if pending.len() >= MAX_PENDING_STATES {
            return Err(ProviderError::Authorization(
                "too many pending authorization attempts".into(),
            ));
        }
        pending.push_back(PendingState {
            state,
            issued_at: now,
        });

        Ok(url.into())
    }

    /// Finishes the OAuth flow started by [`InstagramClient::authorization_url`].
    ///
    /// # Flow
    ///
    /// 1. `state` must be one previously handed out; it is consumed either way
    /// 2. `code` is exchanged for a short-lived token
    /// 3. the short-lived token is exchanged for a long-lived one
    /// 4. the long-lived token replaces the held token and the cache is cleared
    ///
    /// # Errors
    ///
    /// - [`ProviderError::Authorization`] for an unknown `state`
    /// - [`ProviderError::MissingCredentials`] without app id and secret
    /// - [`ProviderError::Upstream`] when either exchange is rejected
    pub async fn complete_authorization(&self, code: &str, state: &str) -> Result<()> {
        self.redeem_state(state).await?;

        let (app_id, app_secret) = self.app_credentials()?;

        let response = self
            .http
            .post(format!("{}/oauth/access_token", self.config.oauth_url))
            .form(&[
                ("client_id", app_id),
                ("client_secret", app_secret),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("code", code),
            ])
            .send()
            .await?;
        let short_lived: ShortLivedTokenResponse =
            ProviderError::check(Provider::Instagram, response).await?.json().await?;

        let response = self
            .http
            .get(format!("{}/access_token", self.config.graph_url))
            .query(&[
                ("grant_type", "ig_exchange_token"),
                ("client_secret", app_secret),
                ("access_token", short_lived.access_token.as_str()),
            ])
            .send()
            .await?;
        let long_lived: LongLivedTokenResponse =
            ProviderError::check(Provider::Instagram, response).await?.json().await?;

        let token = self.store_token(long_lived).await?;
        self.clear_cache().await;
        info!(expires_at = ?token.expires_at, "Instagram authorization completed");
        Ok(())
    }

    /// Extends the held long-lived token.
    ///
    /// Instagram only refreshes tokens that are at least a day old and not
    /// yet expired; a rejection is reported as [`ProviderError::Upstream`]
    /// and the held token is left untouched.
    pub async fn refresh_token(&self) -> Result<InstagramToken> {
        let current = self.access_token().await?;

        let response = self
            .http
            .get(format!("{}/refresh_access_token", self.config.graph_url))
            .query(&[
                ("grant_type", "ig_refresh_token"),
                ("access_token", current.as_str()),
            ])
            .send()
            .await?;
        let refreshed: LongLivedTokenResponse =
            ProviderError::check(Provider::Instagram, response).await?.json().await?;

        let token = self.store_token(refreshed).await?;
        info!(expires_at = ?token.expires_at, "Instagram access token refreshed");
        Ok(token)
    }

    /// Whether a token is held and has not expired.
    pub async fn is_authenticated(&self) -> bool {
        let now = self.clock.now();
        self.token
            .lock()
            .await
            .as_ref()
            .is_some_and(|token| token.is_valid_at(now))
    }

    /// Authentication state for the admin page, with a consent URL when the
    /// admin still needs to authorize.
    pub async fn auth_status(&self) -> InstagramAuthStatus {
        if self.is_authenticated().await {
            return InstagramAuthStatus {
                authenticated: true,
                auth_url: None,
            };
        }

        let auth_url = match self.authorization_url().await {
            Ok(url) => Some(url),
            Err(err) => {
                warn!(error = %err, "cannot build Instagram authorization URL");
                None
            }
        };

        InstagramAuthStatus {
            authenticated: false,
            auth_url,
        }
    }

    async fn redeem_state(&self, state: &str) -> Result<()> {
        let mut pending = self.pending_states.lock().await;
        prune_expired(&mut pending, self.clock.now());
        match pending.iter().position(|p| p.state == state) {
            Some(index) => {
                pending.remove(index);
                Ok(())
            }
            None => Err(ProviderError::Authorization(
                "unknown or expired OAuth state".into(),
            )),
        }
    }

    fn app_credentials(&self) -> Result<(&str, &str)> {
        match (&self.config.app_id, &self.config.app_secret) {
            (Some(id), Some(secret)) => Ok((id.as_str(), secret.as_str())),
            _ => Err(ProviderError::MissingCredentials(
                "INSTAGRAM_APP_ID/INSTAGRAM_APP_SECRET",
            )),
        }
    }

    async fn store_token(&self, response: LongLivedTokenResponse) -> Result<InstagramToken> {
        let token = InstagramToken {
            expires_at: expiry(self.clock.now(), response.expires_in)?,
            access_token: response.access_token,
        };
        *self.token.lock().await = Some(token.clone());
        Ok(token)
    }
}

fn prune_expired(pending: &mut VecDeque<PendingState>, now: DateTime<Utc>) {
    let cutoff = now - Duration::minutes(STATE_TTL_MINUTES);
    pending.retain(|p| p.issued_at > cutoff);
}

fn expiry(now: DateTime<Utc>, expires_in: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    let Some(secs) = expires_in else {
        return Ok(None);
    };
    Duration::try_seconds(secs)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .map(Some)
        .ok_or_else(|| {
            ProviderError::malformed(
                Provider::Instagram,
                format!("token lifetime out of range: {secs}"),
            )
        })
}
