//! Errors raised by the provider clients.

use std::fmt;

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;

/// One of the three upstream services proxied by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Spotify,
    YouTube,
    Instagram,
}

impl Provider {
    /// Lowercase prefix used to namespace cache keys.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Provider::Spotify => "spotify",
            Provider::YouTube => "youtube",
            Provider::Instagram => "instagram",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Spotify => "Spotify",
            Provider::YouTube => "YouTube",
            Provider::Instagram => "Instagram",
        };
        f.write_str(name)
    }
}

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// A credential or app setting needed by the operation is not configured.
    #[error("{0} is not configured")]
    MissingCredentials(&'static str),

    /// The provider answered with a non-2xx status.
    #[error("{provider} API error ({status}): {message}")]
    Upstream {
        provider: Provider,
        status: StatusCode,
        message: String,
    },

    /// The provider returned an empty result for a lookup.
    #[error("{0} not found")]
    NotFound(String),

    /// The payload lacked a field the normalized record cannot do without.
    #[error("malformed {provider} payload: {reason}")]
    Malformed { provider: Provider, reason: String },

    /// An OAuth step was rejected locally (unknown state, denied consent).
    #[error("authorization failed: {0}")]
    Authorization(String),

    /// Transport or body decoding failure.
    #[error("request failed: {0}")]
    Http(reqwest::Error),
}

/// Drops the request URL, which carries the YouTube key or the Instagram
/// token as a query parameter.
impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Http(err.without_url())
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
    error_description: Option<String>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Object { message: Option<String> },
    Code(String),
}

impl ProviderError {
    /// Passes a successful response through, otherwise turns it into
    /// [`ProviderError::Upstream`].
    ///
    /// The message is taken from the provider's JSON error body when it can be
    /// parsed (`error.message`, `error_description`, `error_message`), and
    /// falls back to the HTTP status text.
    pub async fn check(provider: Provider, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = upstream_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });

        Err(ProviderError::Upstream {
            provider,
            status,
            message,
        })
    }

    pub fn malformed(provider: Provider, reason: impl Into<String>) -> Self {
        ProviderError::Malformed {
            provider,
            reason: reason.into(),
        }
    }

    /// Returns the status of an upstream rejection, if this is one.
    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            ProviderError::Upstream { status, .. } => Some(*status),
            ProviderError::Http(err) => err.status(),
            _ => None,
        }
    }
}

fn upstream_message(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let from_detail = match envelope.error {
        Some(ErrorDetail::Object { message }) => message,
        Some(ErrorDetail::Code(code)) => envelope.error_description.clone().or(Some(code)),
        None => None,
    };

    from_detail
        .or(envelope.error_description)
        .or(envelope.error_message)
        .filter(|m| !m.is_empty())
}

/// Unwraps a required payload field or reports which one was missing.
pub(crate) fn required<T>(value: Option<T>, provider: Provider, field: &str) -> Result<T> {
    value.ok_or_else(|| ProviderError::malformed(provider, format!("missing `{field}`")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_from_error_object() {
        let body = r#"{"error":{"status":401,"message":"The access token expired"}}"#;
        assert_eq!(
            upstream_message(body).as_deref(),
            Some("The access token expired")
        );
    }

    #[test]
    fn test_upstream_message_from_oauth_error() {
        let body = r#"{"error":"invalid_client","error_description":"Invalid client secret"}"#;
        assert_eq!(
            upstream_message(body).as_deref(),
            Some("Invalid client secret")
        );

        let body = r#"{"error":"invalid_client"}"#;
        assert_eq!(upstream_message(body).as_deref(), Some("invalid_client"));
    }

    #[test]
    fn test_upstream_message_from_instagram_oauth() {
        let body = r#"{"error_type":"OAuthException","code":400,"error_message":"Invalid redirect_uri"}"#;
        assert_eq!(
            upstream_message(body).as_deref(),
            Some("Invalid redirect_uri")
        );
    }

    #[test]
    fn test_upstream_message_unparseable() {
        assert_eq!(upstream_message("<html>Bad Gateway</html>"), None);
        assert_eq!(upstream_message(r#"{"error":{"code":500}}"#), None);
    }

    #[test]
    fn test_required_reports_field() {
        let err = required::<String>(None, Provider::Spotify, "id").unwrap_err();
        assert_eq!(err.to_string(), "malformed Spotify payload: missing `id`");
    }
}
