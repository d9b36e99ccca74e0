use std::sync::Arc;

use auravox::{
    config::InstagramConfig,
    error::ProviderError,
    instagram::InstagramClient,
    management::ManualClock,
};
use chrono::{Duration, TimeZone, Utc};
use reqwest::{Client, Url};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, method, path, query_param},
};

const REDIRECT_URI: &str = "http://localhost:5000/api/instagram/callback";

fn instagram_config(server: &MockServer, access_token: Option<&str>) -> InstagramConfig {
    InstagramConfig {
        app_id: Some("app-id".into()),
        app_secret: Some("app-secret".into()),
        access_token: access_token.map(String::from),
        graph_url: server.uri(),
        oauth_url: server.uri(),
        redirect_uri: REDIRECT_URI.into(),
    }
}

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
}

fn instagram(server: &MockServer, token: Option<&str>, clock: &ManualClock) -> InstagramClient {
    InstagramClient::with_clock(
        Client::new(),
        instagram_config(server, token),
        Arc::new(clock.clone()),
    )
}

fn state_of(auth_url: &str) -> String {
    Url::parse(auth_url)
        .unwrap()
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap()
}

async fn mount_oauth(server: &MockServer, code: &str, long_lived: &str, expires_in: i64) {
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .and(body_string_contains(format!("code={code}")))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "short-lived", "user_id": 17841 })),
        )
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/access_token"))
        .and(query_param("grant_type", "ig_exchange_token"))
        .and(query_param("client_secret", "app-secret"))
        .and(query_param("access_token", "short-lived"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": long_lived,
            "token_type": "bearer",
            "expires_in": expires_in
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_gallery_keeps_displayable_media() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v13.0/me/media"))
        .and(query_param("limit", "8"))
        .and(query_param("access_token", "env-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "1", "media_type": "IMAGE", "media_url": "https://cdn/1.jpg",
                  "caption": "Berlin, you were loud #auravox #tour", "permalink": "https://instagram.com/p/1" },
                { "id": "2", "media_type": "VIDEO", "media_url": "https://cdn/2.mp4",
                  "thumbnail_url": "https://cdn/2.jpg" },
                { "id": "3", "media_type": "CAROUSEL_ALBUM", "media_url": "https://cdn/3.jpg" },
                { "id": "4", "media_type": "AUDIO", "media_url": "https://cdn/4.m4a" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = instagram(&server, Some("env-token"), &clock);
    let gallery = client.gallery().await.unwrap();

    let ids: Vec<&str> = gallery.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, ["1", "2", "3"]);
    assert_eq!(gallery[0].caption, "Berlin, you were loud");
    assert_eq!(gallery[1].url.as_deref(), Some("https://cdn/2.jpg"));
    assert_eq!(gallery[2].caption, "AURA VOX Instagram post");

    // gallery expires after five minutes but the media list is still cached
    clock.advance(Duration::minutes(10));
    assert_eq!(client.gallery().await.unwrap(), gallery);
}

#[tokio::test]
async fn test_post_and_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v13.0/123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "123", "media_type": "IMAGE", "media_url": "https://cdn/123.jpg",
            "timestamp": "2024-02-01T20:00:00+0000"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v13.0/me"))
        .and(query_param("fields", "id,username,account_type,media_count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "17841", "username": "auravox", "account_type": "BUSINESS", "media_count": 212
        })))
        .mount(&server)
        .await;

    let clock = clock();
    let client = instagram(&server, Some("env-token"), &clock);

    let post = client.post("123").await.unwrap();
    assert_eq!(post.thumbnail.as_deref(), Some("https://cdn/123.jpg"));
    assert_eq!(post.timestamp.as_deref(), Some("2024-02-01T20:00:00+0000"));

    let profile = client.profile().await.unwrap();
    assert_eq!(profile.username.as_deref(), Some("auravox"));
    assert_eq!(profile.media_count, Some(212));
}

#[tokio::test]
async fn test_oauth_flow_replaces_token_and_clears_cache() {
    let server = MockServer::start().await;
    mount_oauth(&server, "auth-code", "long-lived", 5_184_000).await;
    Mock::given(method("GET"))
        .and(path("/v13.0/me"))
        .and(query_param("access_token", "env-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "old" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v13.0/me"))
        .and(query_param("access_token", "long-lived"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "new" })))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = instagram(&server, Some("env-token"), &clock);
    assert_eq!(client.profile().await.unwrap().id, "old");

    let auth_url = client.authorization_url().await.unwrap();
    assert!(auth_url.starts_with(&format!("{}/oauth/authorize?", server.uri())));
    assert!(auth_url.contains("client_id=app-id"));
    assert!(auth_url.contains("response_type=code"));

    client
        .complete_authorization("auth-code", &state_of(&auth_url))
        .await
        .unwrap();

    assert!(client.is_authenticated().await);
    assert_eq!(client.profile().await.unwrap().id, "new");
}

#[tokio::test]
async fn test_unknown_state_is_rejected() {
    let server = MockServer::start().await;
    let clock = clock();
    let client = instagram(&server, None, &clock);

    client.authorization_url().await.unwrap();
    let err = client
        .complete_authorization("auth-code", "forged-state")
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Authorization(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_state_is_single_use() {
    let server = MockServer::start().await;
    mount_oauth(&server, "auth-code", "long-lived", 5_184_000).await;

    let clock = clock();
    let client = instagram(&server, None, &clock);
    let state = state_of(&client.authorization_url().await.unwrap());

    client
        .complete_authorization("auth-code", &state)
        .await
        .unwrap();
    let replay = client.complete_authorization("auth-code", &state).await;

    assert!(matches!(replay, Err(ProviderError::Authorization(_))));
}

#[tokio::test]
async fn test_rejected_code_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_type": "OAuthException",
            "code": 400,
            "error_message": "Matching code was not found or was already used"
        })))
        .mount(&server)
        .await;

    let clock = clock();
    let client = instagram(&server, None, &clock);
    let state = state_of(&client.authorization_url().await.unwrap());

    let err = client
        .complete_authorization("bad-code", &state)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("already used"));
    assert!(!client.is_authenticated().await);
}

#[tokio::test]
async fn test_auth_status() {
    let server = MockServer::start().await;
    let clock = clock();

    let unauthenticated = instagram(&server, None, &clock).auth_status().await;
    assert!(!unauthenticated.authenticated);
    assert!(unauthenticated.auth_url.unwrap().contains("state="));

    let authenticated = instagram(&server, Some("env-token"), &clock)
        .auth_status()
        .await;
    assert!(authenticated.authenticated);
    assert_eq!(authenticated.auth_url, None);
}

#[tokio::test]
async fn test_expired_token_is_not_used() {
    let server = MockServer::start().await;
    mount_oauth(&server, "auth-code", "short-term", 3600).await;

    let clock = clock();
    let client = instagram(&server, None, &clock);
    let state = state_of(&client.authorization_url().await.unwrap());
    client
        .complete_authorization("auth-code", &state)
        .await
        .unwrap();

    clock.advance(Duration::hours(2));

    assert!(!client.is_authenticated().await);
    let err = client.gallery().await.unwrap_err();
    assert!(matches!(err, ProviderError::Authorization(_)));
}

#[tokio::test]
async fn test_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/refresh_access_token"))
        .and(query_param("grant_type", "ig_refresh_token"))
        .and(query_param("access_token", "env-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "refreshed",
            "token_type": "bearer",
            "expires_in": 5_184_000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = instagram(&server, Some("env-token"), &clock);
    let token = client.refresh_token().await.unwrap();

    assert_eq!(token.access_token, "refreshed");
    assert_eq!(
        token.expires_at,
        Some(Utc.with_ymd_and_hms(2024, 4, 30, 12, 0, 0).unwrap())
    );
}

#[tokio::test]
async fn test_missing_token() {
    let server = MockServer::start().await;
    let clock = clock();
    let client = instagram(&server, None, &clock);

    let err = client.gallery().await.unwrap_err();
    assert!(matches!(
        err,
        ProviderError::MissingCredentials("INSTAGRAM_ACCESS_TOKEN")
    ));
}

#[tokio::test]
async fn test_transport_error_hides_access_token() {
    let config = InstagramConfig {
        app_id: Some("app-id".into()),
        app_secret: Some("app-secret".into()),
        access_token: Some("IGTOKEN456".into()),
        graph_url: "http://127.0.0.1:1".into(),
        oauth_url: "http://127.0.0.1:1".into(),
        redirect_uri: REDIRECT_URI.into(),
    };
    let client = InstagramClient::new(Client::new(), config);

    let err = client.gallery().await.unwrap_err();
    assert!(matches!(err, ProviderError::Http(_)));
    assert!(!err.to_string().contains("IGTOKEN456"));
    assert!(!format!("{err:?}").contains("IGTOKEN456"));
}

#[tokio::test]
async fn test_polling_status_keeps_pending_state() {
    let server = MockServer::start().await;
    mount_oauth(&server, "auth-code", "long-lived", 5_184_000).await;

    let clock = clock();
    let client = instagram(&server, None, &clock);
    let state = state_of(&client.authorization_url().await.unwrap());

    for _ in 0..20 {
        client.auth_status().await;
    }
    assert!(client.authorization_url().await.is_err());

    client
        .complete_authorization("auth-code", &state)
        .await
        .unwrap();
    assert!(client.is_authenticated().await);
}

#[tokio::test]
async fn test_state_expires_after_ten_minutes() {
    let server = MockServer::start().await;
    let clock = clock();
    let client = instagram(&server, None, &clock);

    let state = state_of(&client.authorization_url().await.unwrap());
    for _ in 0..15 {
        client.authorization_url().await.unwrap();
    }
    assert!(client.authorization_url().await.is_err());

    clock.advance(Duration::minutes(10));

    let err = client
        .complete_authorization("auth-code", &state)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Authorization(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(client.authorization_url().await.is_ok());
}
