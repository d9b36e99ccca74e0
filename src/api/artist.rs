use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    server::AppState,
    types::{ArtistInfo, TourDate},
};

pub async fn info(State(state): State<Arc<AppState>>) -> Json<ArtistInfo> {
    Json(state.artist.artist_info().clone())
}

pub async fn tour_dates(State(state): State<Arc<AppState>>) -> Json<Vec<TourDate>> {
    Json(state.artist.tour_dates().to_vec())
}
