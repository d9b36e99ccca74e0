use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};

use super::{
    SearchParams,
    error::{ApiError, OrApiError},
};
use crate::{
    server::AppState,
    types::{Album, Artist, Track},
};

pub async fn featured_track(State(state): State<Arc<AppState>>) -> Result<Json<Track>, ApiError> {
    let track = state
        .spotify
        .featured_track()
        .await
        .or_api_error("Failed to fetch featured track from Spotify")?;
    Ok(Json(track))
}

pub async fn popular_tracks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Track>>, ApiError> {
    let tracks = state
        .spotify
        .popular_tracks()
        .await
        .or_api_error("Failed to fetch popular tracks from Spotify")?;
    Ok(Json(tracks))
}

pub async fn albums(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Album>>, ApiError> {
    let albums = state
        .spotify
        .albums()
        .await
        .or_api_error("Failed to fetch albums from Spotify")?;
    Ok(Json(albums))
}

pub async fn track(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Track>, ApiError> {
    let track = state
        .spotify
        .track(&id)
        .await
        .or_api_error("Failed to fetch track from Spotify")?;
    Ok(Json(track))
}

pub async fn artist(State(state): State<Arc<AppState>>) -> Result<Json<Artist>, ApiError> {
    let artist = state
        .spotify
        .artist_profile()
        .await
        .or_api_error("Failed to fetch artist profile from Spotify")?;
    Ok(Json(artist))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Track>>, ApiError> {
    let query = params.required_query()?;
    let tracks = state
        .spotify
        .search_tracks(query)
        .await
        .or_api_error("Failed to search tracks on Spotify")?;
    Ok(Json(tracks))
}
