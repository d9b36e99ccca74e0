//! # API Module
//!
//! HTTP route handlers of the AURA VOX site API, built on
//! [Axum](https://docs.rs/axum). Every handler receives the shared
//! [`AppState`](crate::server::AppState) and delegates to one provider client
//! or to the static artist store; the routes themselves are assembled in
//! [`crate::server::router`].
//!
//! ## Endpoints
//!
//! ### Artist
//!
//! - `GET /api/artist/info` - [`artist::info`]
//! - `GET /api/artist/tour-dates` - [`artist::tour_dates`]
//!
//! ### Spotify
//!
//! - `GET /api/spotify/featured-track`, `/popular-tracks`, `/albums`,
//!   `/track/{id}`, `/artist`, `/search?q=` - [`spotify`]
//!
//! ### YouTube
//!
//! - `GET /api/youtube/videos`, `/featured`, `/video/{id}`, `/search?q=`
//! - `POST /api/youtube/clear-cache` - [`youtube`]
//!
//! ### Instagram
//!
//! - `GET /api/instagram/gallery`, `/post/{id}`, `/profile`
//! - `GET /api/instagram/auth`, `/callback`, `/status` - OAuth flow
//! - `POST /api/instagram/refresh-token`, `/clear-cache` - [`instagram`]
//!
//! ### Monitoring
//!
//! - `GET /api/status` - [`status::status`], upstream reachability
//!
//! ## Errors
//!
//! Failures are answered with HTTP 500 and a body of the form
//! `{ "message": "Failed to fetch albums from Spotify" }`. The provider's own
//! error text is only written to the log, never to the response.

pub mod artist;
pub mod error;
pub mod instagram;
pub mod spotify;
pub mod status;
pub mod youtube;

use serde::Deserialize;

pub use error::ApiError;

/// `?q=` of the search routes.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

impl SearchParams {
    /// The trimmed query, or a 500 when it is missing or blank.
    fn required_query(&self) -> Result<&str, ApiError> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ApiError::internal("Search query is required", "missing `q` parameter"))
    }
}
