//! Public niche and statistics endpoints

use axum::{extract::State, routing::get, Json, Router};
use infobytes_common::models::{Niche, Stats};
use serde::Serialize;

use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct NichesEnvelope {
    pub niches: Vec<Niche>,
}

/// GET /niches
pub async fn list_niches(State(state): State<AppState>) -> ApiResult<Json<NichesEnvelope>> {
    let niches = state.store.niches().await?;
    Ok(Json(NichesEnvelope { niches }))
}

/// GET /stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<Stats>> {
    Ok(Json(state.store.stats().await?))
}

pub fn niche_routes() -> Router<AppState> {
    Router::new()
        .route("/niches", get(list_niches))
        .route("/stats", get(stats))
}
