use std::sync::Arc;

use crate::{config::Config, error, info, server, warning};

/// Starts the HTTP API and blocks until it stops.
///
/// Missing provider credentials are reported as warnings only: the routes of
/// an unconfigured provider answer 500 while everything else keeps working.
///
/// # Arguments
///
/// * `config` - Configuration read from the environment
/// * `addr` - Overrides `SERVER_ADDRESS` when given
pub async fn serve(config: Config, addr: Option<String>) {
    let addr = addr.unwrap_or_else(|| config.server_addr.clone());

    for missing in missing_credentials(&config) {
        warning!("{} is not set, its routes will answer with errors", missing);
    }

    let state = Arc::new(server::AppState::new(config));

    info!("Starting AURA VOX API on {}", addr);
    if let Err(e) = server::start_api_server(state, &addr).await {
        error!("Server stopped. Err: {}", e);
    }
}

/// Names of the unset variables that disable part of the API.
pub fn missing_credentials(config: &Config) -> Vec<&'static str> {
    let checks = [
        ("SPOTIFY_CLIENT_ID", config.spotify.client_id.is_some()),
        ("SPOTIFY_CLIENT_SECRET", config.spotify.client_secret.is_some()),
        ("YOUTUBE_API_KEY", config.youtube.api_key.is_some()),
        ("INSTAGRAM_APP_ID", config.instagram.app_id.is_some()),
        ("INSTAGRAM_APP_SECRET", config.instagram.app_secret.is_some()),
        ("INSTAGRAM_ACCESS_TOKEN", config.instagram.access_token.is_some()),
    ];

    checks
        .into_iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| name)
        .collect()
}
