use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Client;

use crate::{
    error::{Provider, ProviderError, Result},
    types::{ClientCredentials, TokenResponse},
};

/// Exchanges the app's client id and secret for a bearer token.
///
/// Performs the OAuth 2.0 client-credentials grant against the Spotify
/// accounts service. No user is involved, so the token only unlocks public
/// catalog endpoints, which is all the site needs.
///
/// # Arguments
///
/// * `http` - Shared HTTP client
/// * `token_url` - Token endpoint, usually `https://accounts.spotify.com/api/token`
/// * `credentials` - Client id and secret of the registered app
///
/// # Errors
///
/// Returns [`ProviderError::Upstream`] when the accounts service rejects the
/// credentials, and [`ProviderError::Http`] on transport or decode failures.
/// The call is never retried here.
pub async fn request_client_credentials(
    http: &Client,
    token_url: &str,
    credentials: &ClientCredentials,
) -> Result<TokenResponse> {
    let response = http
        .post(token_url)
        .header(
            reqwest::header::AUTHORIZATION,
            basic_auth_header(credentials),
        )
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await?;

    let response = ProviderError::check(Provider::Spotify, response).await?;
    Ok(response.json::<TokenResponse>().await?)
}

/// `Basic base64(client_id:client_secret)`
pub fn basic_auth_header(credentials: &ClientCredentials) -> String {
    let raw = format!("{}:{}", credentials.client_id, credentials.client_secret);
    format!("Basic {}", STANDARD.encode(raw))
}
