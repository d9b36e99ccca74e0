use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::warn;

use crate::{
    error::Result,
    server::AppState,
    types::{ProbeState, UpstreamStatus},
};

/// Reports whether each upstream is reachable with the configured credentials.
///
/// The probes bypass the caches and run concurrently. A provider without
/// credentials is reported as `unconfigured` and not contacted.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<UpstreamStatus> {
    Json(check_upstreams(&state).await)
}

pub async fn check_upstreams(state: &AppState) -> UpstreamStatus {
    let spotify = async {
        if !state.spotify.is_configured() {
            return ProbeState::Unconfigured;
        }
        probe_state("Spotify", state.spotify.probe().await)
    };

    let youtube = async {
        if !state.youtube.is_configured() {
            return ProbeState::Unconfigured;
        }
        probe_state("YouTube", state.youtube.probe().await)
    };

    let (spotify, youtube, instagram) =
        tokio::join!(spotify, youtube, state.instagram.is_authenticated());

    UpstreamStatus {
        spotify,
        youtube,
        instagram,
        checked_at: state.clock.now(),
    }
}

fn probe_state(provider: &str, result: Result<()>) -> ProbeState {
    match result {
        Ok(()) => ProbeState::Ok,
        Err(err) => {
            warn!(provider, error = %err, "upstream probe failed");
            ProbeState::Unavailable
        }
    }
}
