use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

// Tokens and credentials

#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Seconds cut from a token's lifetime so it is never used right at expiry.
pub const TOKEN_SAFETY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// A token issued at `now` that the provider says lives `expires_in`
    /// seconds, shortened by [`TOKEN_SAFETY_MARGIN_SECS`].
    ///
    /// `None` when the lifetime does not fit a timestamp.
    pub fn issued(token: String, expires_in: i64, now: DateTime<Utc>) -> Option<Self> {
        let lifetime = Duration::try_seconds(expires_in.checked_sub(TOKEN_SAFETY_MARGIN_SECS)?)?;
        Some(Self {
            token,
            expires_at: now.checked_add_signed(lifetime)?,
        })
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

// Spotify: normalized

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Followers {
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers: Option<Followers>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub album_type: String,
    pub release_date: String,
    pub images: Vec<Image>,
    pub artists: Vec<Artist>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub duration_ms: u64,
    pub popularity: u32,
    pub album: Album,
    pub artists: Vec<Artist>,
    pub preview_url: Option<String>,
}

// Spotify: payloads

#[derive(Debug, Clone, Deserialize)]
pub struct FollowersPayload {
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistPayload {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub followers: Option<FollowersPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumPayload {
    pub id: Option<String>,
    pub name: Option<String>,
    pub album_type: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub artists: Vec<ArtistPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackPayload {
    pub id: Option<String>,
    pub name: Option<String>,
    pub duration_ms: Option<u64>,
    pub popularity: Option<u32>,
    pub album: Option<AlbumPayload>,
    #[serde(default)]
    pub artists: Vec<ArtistPayload>,
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopTracksResponse {
    #[serde(default)]
    pub tracks: Vec<TrackPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTracksResponse {
    pub tracks: Option<Paging<TrackPayload>>,
}

// YouTube: normalized

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thumbnails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Thumbnail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<Thumbnail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Thumbnail>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCategory {
    Live,
    Music,
    Behind,
    Interview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnails: Thumbnails,
    pub published_at: Option<String>,
    pub duration: String,
    pub view_count: String,
    pub category: VideoCategory,
}

// YouTube: payloads

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThumbnailsPayload {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
    pub standard: Option<Thumbnail>,
    pub maxres: Option<Thumbnail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub title: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<String>,
    #[serde(default)]
    pub thumbnails: ThumbnailsPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentDetails {
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub view_count: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    pub id: SearchItemId,
    pub snippet: Option<Snippet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    pub snippet: Option<Snippet>,
    pub content_details: Option<ContentDetails>,
    pub statistics: Option<Statistics>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideosResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

// Instagram: normalized

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryImage {
    pub id: String,
    pub url: Option<String>,
    pub caption: String,
    pub thumbnail: Option<String>,
    pub timestamp: Option<String>,
    pub permalink: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstagramProfile {
    pub id: String,
    pub username: Option<String>,
    pub account_type: Option<String>,
    pub media_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstagramAuthStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstagramToken {
    pub access_token: String,
    /// `None` for a token taken from the environment, whose lifetime is unknown.
    pub expires_at: Option<DateTime<Utc>>,
}

impl InstagramToken {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

// Instagram: payloads

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    Image,
    CarouselAlbum,
    Video,
    #[default]
    #[serde(other)]
    Other,
}

impl MediaType {
    /// Media kinds that can be shown in the gallery.
    pub fn is_displayable(&self) -> bool {
        matches!(
            self,
            MediaType::Image | MediaType::CarouselAlbum | MediaType::Video
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaPayload {
    pub id: Option<String>,
    pub caption: Option<String>,
    #[serde(default)]
    pub media_type: MediaType,
    pub media_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub permalink: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaResponse {
    #[serde(default)]
    pub data: Vec<MediaPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfilePayload {
    pub id: Option<String>,
    pub username: Option<String>,
    pub account_type: Option<String>,
    pub media_count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShortLivedTokenResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LongLivedTokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
}

// Static artist records

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistInfo {
    pub id: i32,
    pub name: String,
    pub bio: String,
    pub location: String,
    pub since: i32,
    pub monthly_listeners: Option<u64>,
    pub releases: Option<u32>,
    pub countries_visited: Option<u32>,
    pub genres: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourDate {
    pub id: i32,
    pub date: DateTime<Utc>,
    pub venue: String,
    pub location: String,
    pub ticket_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Upstream health

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeState {
    Ok,
    Unavailable,
    Unconfigured,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamStatus {
    pub spotify: ProbeState,
    pub youtube: ProbeState,
    pub instagram: bool,
    pub checked_at: DateTime<Utc>,
}

#[derive(Tabled)]
pub struct StatusTableRow {
    pub provider: String,
    pub configured: String,
    pub status: String,
}
