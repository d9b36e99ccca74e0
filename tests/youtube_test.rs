use std::sync::Arc;

use auravox::{
    config::YouTubeConfig,
    error::ProviderError,
    management::ManualClock,
    types::VideoCategory,
    youtube::YouTubeClient,
};
use chrono::{Duration, TimeZone, Utc};
use reqwest::Client;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param, query_param_is_missing},
};

const CHANNEL_ID: &str = "UCchannel";

fn youtube(server: &MockServer, clock: &ManualClock) -> YouTubeClient {
    let config = YouTubeConfig {
        api_key: Some("yt-key".into()),
        api_url: server.uri(),
        channel_id: CHANNEL_ID.into(),
    };
    YouTubeClient::with_clock(Client::new(), config, Arc::new(clock.clone()))
}

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
}

fn search_item(id: &str, title: &str, description: &str) -> Value {
    json!({
        "id": { "kind": "youtube#video", "videoId": id },
        "snippet": {
            "title": title,
            "description": description,
            "publishedAt": "2024-02-09T17:00:00Z",
            "thumbnails": {
                "default": { "url": format!("https://i.ytimg.com/{id}/default.jpg"), "width": 120, "height": 90 },
                "high": { "url": format!("https://i.ytimg.com/{id}/hq.jpg"), "width": 480, "height": 360 }
            }
        }
    })
}

fn details(id: &str, duration: &str, views: &str) -> Value {
    json!({
        "id": id,
        "contentDetails": { "duration": duration },
        "statistics": { "viewCount": views }
    })
}

#[tokio::test]
async fn test_videos_are_enriched_with_one_batched_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("key", "yt-key"))
        .and(query_param("channelId", CHANNEL_ID))
        .and(query_param("maxResults", "6"))
        .and(query_param("order", "date"))
        .and(query_param("type", "video"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                search_item("v1", "Static Bloom (Official Video)", ""),
                search_item("v2", "Night Signals - Live at Paradiso", ""),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "v1,v2"))
        .and(query_param("part", "contentDetails,statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                details("v1", "PT3M45S", "1234567"),
                details("v2", "PT1H2M3S", "950"),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let client = youtube(&server, &clock);
    let videos = client.videos().await.unwrap();

    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0].duration, "3:45");
    assert_eq!(videos[0].view_count, "1.2M");
    assert_eq!(videos[0].category, VideoCategory::Music);
    assert_eq!(videos[1].duration, "1:02:03");
    assert_eq!(videos[1].view_count, "950");
    assert_eq!(videos[1].category, VideoCategory::Live);

    // medium thumbnail is missing upstream and falls back to high
    let medium = videos[0].thumbnails.medium.as_ref().unwrap();
    assert_eq!(medium.url, "https://i.ytimg.com/v1/hq.jpg");

    // a second call within the hour hits the cache
    clock.advance(Duration::minutes(30));
    assert_eq!(client.videos().await.unwrap(), videos);
}

#[tokio::test]
async fn test_failed_details_keep_placeholders() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [search_item("v1", "Studio diary", "Behind the scenes in Berlin")]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "quotaExceeded" }
        })))
        .mount(&server)
        .await;

    let clock = clock();
    let videos = youtube(&server, &clock).videos().await.unwrap();

    assert_eq!(videos[0].duration, "0:00");
    assert_eq!(videos[0].view_count, "0");
    assert_eq!(videos[0].category, VideoCategory::Behind);
}

#[tokio::test]
async fn test_featured_video_orders_by_views() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("order", "viewCount"))
        .and(query_param("maxResults", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [search_item("v9", "AURA VOX interview", "")]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "v9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [details("v9", "PT12M", "45300")]
        })))
        .mount(&server)
        .await;

    let clock = clock();
    let video = youtube(&server, &clock).featured_video().await.unwrap();

    assert_eq!(video.id, "v9");
    assert_eq!(video.duration, "12:00");
    assert_eq!(video.view_count, "45.3K");
    assert_eq!(video.category, VideoCategory::Interview);
}

#[tokio::test]
async fn test_featured_video_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let clock = clock();
    let err = youtube(&server, &clock).featured_video().await.unwrap_err();
    assert!(matches!(err, ProviderError::NotFound(_)));
}

#[tokio::test]
async fn test_video_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "v1"))
        .and(query_param("part", "snippet,contentDetails,statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "v1",
                "snippet": { "title": "Static Bloom (Official Audio)", "description": "Out now" },
                "contentDetails": { "duration": "PT4M5S" },
                "statistics": { "viewCount": "1000" }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let video = youtube(&server, &clock).video("v1").await.unwrap();

    assert_eq!(video.title, "Static Bloom (Official Audio)");
    assert_eq!(video.duration, "4:05");
    assert_eq!(video.view_count, "1.0K");
    assert_eq!(video.published_at, None);
}

#[tokio::test]
async fn test_unknown_video_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let clock = clock();
    let err = youtube(&server, &clock).video("nope").await.unwrap_err();
    assert_eq!(err.to_string(), "video nope not found");
}

#[tokio::test]
async fn test_search_is_not_limited_to_channel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "aura vox"))
        .and(query_param("maxResults", "10"))
        .and(query_param_is_missing("channelId"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [search_item("v3", "Teaser", "")]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [details("v3", "PT30S", "12")]
        })))
        .mount(&server)
        .await;

    let clock = clock();
    let results = youtube(&server, &clock)
        .search_videos("aura vox")
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].duration, "0:30");
}

#[tokio::test]
async fn test_clear_cache_forces_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [details("v1", "PT1M", "5")]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let clock = clock();
    let client = youtube(&server, &clock);

    client.video("v1").await.unwrap();
    client.video("v1").await.unwrap();
    client.clear_cache().await;
    client.video("v1").await.unwrap();
}

#[tokio::test]
async fn test_missing_api_key() {
    let server = MockServer::start().await;
    let config = YouTubeConfig {
        api_key: None,
        api_url: server.uri(),
        channel_id: CHANNEL_ID.into(),
    };
    let client = YouTubeClient::new(Client::new(), config);

    assert!(!client.is_configured());
    let err = client.videos().await.unwrap_err();
    assert!(matches!(err, ProviderError::MissingCredentials("YOUTUBE_API_KEY")));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_probe_checks_channel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("part", "id"))
        .and(query_param("id", CHANNEL_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(2)
        .mount(&server)
        .await;

    let clock = clock();
    let client = youtube(&server, &clock);

    // never cached
    client.probe().await.unwrap();
    client.probe().await.unwrap();
}

#[tokio::test]
async fn test_transport_error_hides_api_key() {
    let config = YouTubeConfig {
        api_key: Some("SECRETKEY123".into()),
        api_url: "http://127.0.0.1:1".into(),
        channel_id: CHANNEL_ID.into(),
    };
    let client = YouTubeClient::new(Client::new(), config);

    let err = client.video("v1").await.unwrap_err();
    assert!(matches!(err, ProviderError::Http(_)));
    assert!(!err.to_string().contains("SECRETKEY123"));
    assert!(!format!("{err:?}").contains("SECRETKEY123"));
}
