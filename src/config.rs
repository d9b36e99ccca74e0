//! Configuration management for the AURA VOX site API.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. Provider credentials are optional at
//! startup: a missing credential only fails the operations that need it, so the
//! static routes and the remaining providers keep working.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. `.env` file in the working directory
//! 4. Application defaults (where applicable)

use std::{env, path::PathBuf};

pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:5000";

pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SPOTIFY_ARTIST_ID: &str = "4LE04Repf0XC6R1oAFU1bA";
pub const DEFAULT_SPOTIFY_MARKET: &str = "US";

pub const DEFAULT_YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_YOUTUBE_CHANNEL_ID: &str = "UC_kRDdJJBmZ-RUEUKLqu3Ug";

pub const DEFAULT_INSTAGRAM_GRAPH_URL: &str = "https://graph.instagram.com";
pub const DEFAULT_INSTAGRAM_OAUTH_URL: &str = "https://api.instagram.com";
pub const DEFAULT_INSTAGRAM_REDIRECT_URI: &str = "http://localhost:5000/api/instagram/callback";

/// Loads environment variables from `.env` files.
///
/// Looks first in the platform-specific local data directory under
/// `auravox/.env`, creating the directory if needed, and then in the working
/// directory. Variables already present in the process environment are never
/// overridden, and a missing file is not an error.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/auravox/.env`
/// - macOS: `~/Library/Application Support/auravox/.env`
/// - Windows: `%LOCALAPPDATA%/auravox/.env`
///
/// # Errors
///
/// Returns an error string if the data directory cannot be created.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("auravox/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    dotenv::from_path(&path).ok();
    dotenv::dotenv().ok();
    Ok(())
}

/// Spotify Web API settings.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_url: String,
    pub token_url: String,
    pub artist_id: String,
    pub market: String,
}

/// YouTube Data API settings.
#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub channel_id: String,
}

/// Instagram Graph API and OAuth settings.
#[derive(Debug, Clone)]
pub struct InstagramConfig {
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    /// Long-lived token used until the OAuth flow produces a new one.
    pub access_token: Option<String>,
    pub graph_url: String,
    pub oauth_url: String,
    pub redirect_uri: String,
}

/// Complete server configuration.
///
/// Built once at startup with [`Config::from_env`] and handed to the provider
/// clients. Tests build it with [`Config::default`] and point the URLs at a
/// mock server.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub spotify: SpotifyConfig,
    pub youtube: YouTubeConfig,
    pub instagram: InstagramConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: DEFAULT_SERVER_ADDRESS.to_string(),
            spotify: SpotifyConfig {
                client_id: None,
                client_secret: None,
                api_url: DEFAULT_SPOTIFY_API_URL.to_string(),
                token_url: DEFAULT_SPOTIFY_TOKEN_URL.to_string(),
                artist_id: DEFAULT_SPOTIFY_ARTIST_ID.to_string(),
                market: DEFAULT_SPOTIFY_MARKET.to_string(),
            },
            youtube: YouTubeConfig {
                api_key: None,
                api_url: DEFAULT_YOUTUBE_API_URL.to_string(),
                channel_id: DEFAULT_YOUTUBE_CHANNEL_ID.to_string(),
            },
            instagram: InstagramConfig {
                app_id: None,
                app_secret: None,
                access_token: None,
                graph_url: DEFAULT_INSTAGRAM_GRAPH_URL.to_string(),
                oauth_url: DEFAULT_INSTAGRAM_OAUTH_URL.to_string(),
                redirect_uri: DEFAULT_INSTAGRAM_REDIRECT_URI.to_string(),
            },
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// Call [`load_env`] first so `.env` values are visible. Empty variables
    /// count as unset.
    ///
    /// # Example
    ///
    /// ```
    /// config::load_env().await?;
    /// let config = Config::from_env();
    /// println!("binding {}", config.server_addr);
    /// ```
    pub fn from_env() -> Self {
        Self {
            server_addr: var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            spotify: SpotifyConfig {
                client_id: var("SPOTIFY_CLIENT_ID"),
                client_secret: var("SPOTIFY_CLIENT_SECRET"),
                api_url: var_or("SPOTIFY_API_URL", DEFAULT_SPOTIFY_API_URL),
                token_url: var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_SPOTIFY_TOKEN_URL),
                artist_id: var_or("SPOTIFY_ARTIST_ID", DEFAULT_SPOTIFY_ARTIST_ID),
                market: var_or("SPOTIFY_MARKET", DEFAULT_SPOTIFY_MARKET),
            },
            youtube: YouTubeConfig {
                api_key: var("YOUTUBE_API_KEY"),
                api_url: var_or("YOUTUBE_API_URL", DEFAULT_YOUTUBE_API_URL),
                channel_id: var_or("YOUTUBE_CHANNEL_ID", DEFAULT_YOUTUBE_CHANNEL_ID),
            },
            instagram: InstagramConfig {
                app_id: var("INSTAGRAM_APP_ID"),
                app_secret: var("INSTAGRAM_APP_SECRET"),
                access_token: var("INSTAGRAM_ACCESS_TOKEN"),
                graph_url: var_or("INSTAGRAM_GRAPH_URL", DEFAULT_INSTAGRAM_GRAPH_URL),
                oauth_url: var_or("INSTAGRAM_OAUTH_URL", DEFAULT_INSTAGRAM_OAUTH_URL),
                redirect_uri: var_or("INSTAGRAM_REDIRECT_URI", DEFAULT_INSTAGRAM_REDIRECT_URI),
            },
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn var_or(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|| default.to_string())
}
