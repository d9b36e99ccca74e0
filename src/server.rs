use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use reqwest::Client;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    Res, api,
    config::Config,
    instagram::InstagramClient,
    management::{ArtistStore, Clock, SystemClock},
    spotify::SpotifyClient,
    youtube::YouTubeClient,
};

/// Everything the route handlers share.
///
/// Built once at startup; each provider client owns its own cache and
/// credentials, so nothing here is global.
pub struct AppState {
    pub artist: ArtistStore,
    pub spotify: SpotifyClient,
    pub youtube: YouTubeClient,
    pub instagram: InstagramClient,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_clock(Client::new(), config, Arc::new(SystemClock))
    }

    /// Builds the state around a given HTTP client and clock.
    ///
    /// All three provider clients share `http` (and with it the connection
    /// pool) and read time from `clock`.
    pub fn with_clock(http: Client, config: Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            artist: ArtistStore::seeded(),
            spotify: SpotifyClient::with_clock(http.clone(), config.spotify, Arc::clone(&clock)),
            youtube: YouTubeClient::with_clock(http.clone(), config.youtube, Arc::clone(&clock)),
            instagram: InstagramClient::with_clock(http, config.instagram, Arc::clone(&clock)),
            clock,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/artist/info", get(api::artist::info))
        .route("/api/artist/tour-dates", get(api::artist::tour_dates))
        .route("/api/spotify/featured-track", get(api::spotify::featured_track))
        .route("/api/spotify/popular-tracks", get(api::spotify::popular_tracks))
        .route("/api/spotify/albums", get(api::spotify::albums))
        .route("/api/spotify/track/{id}", get(api::spotify::track))
        .route("/api/spotify/artist", get(api::spotify::artist))
        .route("/api/spotify/search", get(api::spotify::search))
        .route("/api/youtube/videos", get(api::youtube::videos))
        .route("/api/youtube/featured", get(api::youtube::featured))
        .route("/api/youtube/video/{id}", get(api::youtube::video))
        .route("/api/youtube/search", get(api::youtube::search))
        .route("/api/youtube/clear-cache", post(api::youtube::clear_cache))
        .route("/api/instagram/gallery", get(api::instagram::gallery))
        .route("/api/instagram/post/{id}", get(api::instagram::post))
        .route("/api/instagram/profile", get(api::instagram::profile))
        .route("/api/instagram/auth", get(api::instagram::auth))
        .route("/api/instagram/callback", get(api::instagram::callback))
        .route("/api/instagram/status", get(api::instagram::status))
        .route(
            "/api/instagram/refresh-token",
            post(api::instagram::refresh_token),
        )
        .route(
            "/api/instagram/clear-cache",
            post(api::instagram::clear_cache),
        )
        .route("/api/status", get(api::status::status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `addr` and serves the API until the process is stopped.
///
/// # Errors
///
/// Fails if `addr` is not a socket address or cannot be bound.
pub async fn start_api_server(state: Arc<AppState>, addr: &str) -> Res<()> {
    let addr = SocketAddr::from_str(addr)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "AURA VOX API listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
