use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::{Value, json};

use super::{
    SearchParams,
    error::{ApiError, OrApiError},
};
use crate::{server::AppState, types::Video};

pub async fn videos(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Video>>, ApiError> {
    let videos = state
        .youtube
        .videos()
        .await
        .or_api_error("Failed to fetch videos from YouTube")?;
    Ok(Json(videos))
}

pub async fn featured(State(state): State<Arc<AppState>>) -> Result<Json<Video>, ApiError> {
    let video = state
        .youtube
        .featured_video()
        .await
        .or_api_error("Failed to fetch featured video from YouTube")?;
    Ok(Json(video))
}

pub async fn video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Video>, ApiError> {
    let video = state
        .youtube
        .video(&id)
        .await
        .or_api_error("Failed to fetch video from YouTube")?;
    Ok(Json(video))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Video>>, ApiError> {
    let query = params.required_query()?;
    let videos = state
        .youtube
        .search_videos(query)
        .await
        .or_api_error("Failed to search videos on YouTube")?;
    Ok(Json(videos))
}

pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.youtube.clear_cache().await;
    Json(json!({ "message": "YouTube cache cleared" }))
}
