use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Html,
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::error::{ApiError, OrApiError};
use crate::{
    error::ProviderError,
    server::AppState,
    types::{GalleryImage, InstagramAuthStatus, InstagramProfile},
};

const CALLBACK_FAILED: &str = "Failed to complete Instagram authorization";

/// Query string Instagram appends when redirecting back after consent.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

pub async fn gallery(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<GalleryImage>>, ApiError> {
    let gallery = state
        .instagram
        .gallery()
        .await
        .or_api_error("Failed to fetch gallery from Instagram")?;
    Ok(Json(gallery))
}

pub async fn post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GalleryImage>, ApiError> {
    let post = state
        .instagram
        .post(&id)
        .await
        .or_api_error("Failed to fetch post from Instagram")?;
    Ok(Json(post))
}

pub async fn profile(
    State(state): State<Arc<AppState>>,
) -> Result<Json<InstagramProfile>, ApiError> {
    let profile = state
        .instagram
        .profile()
        .await
        .or_api_error("Failed to fetch profile from Instagram")?;
    Ok(Json(profile))
}

pub async fn auth(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let auth_url = state
        .instagram
        .authorization_url()
        .await
        .or_api_error("Failed to generate Instagram authorization URL")?;
    Ok(Json(json!({ "authUrl": auth_url })))
}

pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Html<&'static str>, ApiError> {
    if let Some(error) = params.error {
        let reason = params.error_description.unwrap_or(error);
        return Err(ApiError::internal(
            CALLBACK_FAILED,
            ProviderError::Authorization(reason),
        ));
    }

    let (Some(code), Some(oauth_state)) = (params.code, params.state) else {
        return Err(ApiError::internal(
            CALLBACK_FAILED,
            ProviderError::Authorization("callback without code or state".into()),
        ));
    };

    state
        .instagram
        .complete_authorization(&code, &oauth_state)
        .await
        .or_api_error(CALLBACK_FAILED)?;

    Ok(Html(
        "<h2>Instagram connected.</h2><p>You can close this window and return to the site.</p>",
    ))
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<InstagramAuthStatus> {
    Json(state.instagram.auth_status().await)
}

pub async fn refresh_token(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let token = state
        .instagram
        .refresh_token()
        .await
        .or_api_error("Failed to refresh Instagram access token")?;
    Ok(Json(json!({
        "message": "Instagram access token refreshed",
        "expiresAt": token.expires_at,
    })))
}

pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.instagram.clear_cache().await;
    Json(json!({ "message": "Instagram cache cleared" }))
}
