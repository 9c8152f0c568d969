//! Admin endpoints: post CRUD, niche toggling, AI generation, image search
//!
//! Mounted behind [`super::auth_middleware`].

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use infobytes_common::config::BackendMode;
use infobytes_common::models::{Market, NewPost, Niche, Post, PostPage, PostQuery, PostUpdate};
use infobytes_gen::batch::{run_batch, BatchReport};
use infobytes_gen::images::HeroImage;
use infobytes_gen::{GeneratedPost, PostGenerator, PromptDraft};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::api::niches::NichesEnvelope;
use crate::{ApiError, ApiResult, AppState};

/// Posts one admin batch may request
pub const MAX_ADMIN_BATCH: u32 = 10;

/// Default and largest page of image candidates
const DEFAULT_IMAGE_RESULTS: u32 = 5;
const MAX_IMAGE_RESULTS: u32 = 15;

#[derive(Debug, Serialize)]
pub struct AdminPostEnvelope {
    pub post: Post,
}

#[derive(Debug, Serialize)]
pub struct NicheEnvelope {
    pub niche: Niche,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub niche: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    #[serde(default = "default_batch_count")]
    pub count: u32,
    #[serde(default)]
    pub niche: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub prompt: String,
    #[serde(default)]
    pub market: Market,
}

#[derive(Debug, Deserialize)]
pub struct ImageSearchParams {
    #[serde(default)]
    pub q: String,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ImagesEnvelope {
    pub images: Vec<HeroImage>,
}

fn default_batch_count() -> u32 {
    1
}

/// The generator, or why generation is unavailable here
fn generator(state: &AppState) -> ApiResult<Arc<PostGenerator>> {
    if state.store.kind() == BackendMode::Remote {
        return Err(ApiError::Conflict(
            "Generation runs on the remote backend's own scheduler".to_string(),
        ));
    }
    state.generator.clone().ok_or_else(|| {
        ApiError::Internal("Generation is not configured (GEMINI_API_KEY not set)".to_string())
    })
}

/// GET /admin/posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostQuery>,
) -> ApiResult<Json<PostPage>> {
    Ok(Json(state.store.search_posts(&query).await?))
}

/// POST /admin/posts
pub async fn create_post(
    State(state): State<AppState>,
    Json(body): Json<NewPost>,
) -> ApiResult<(StatusCode, Json<AdminPostEnvelope>)> {
    let post = state.store.create_post(body).await?;
    info!(slug = %post.slug, "Admin created post {}", post.id);
    Ok((StatusCode::CREATED, Json(AdminPostEnvelope { post })))
}

/// GET /admin/posts/:id
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<AdminPostEnvelope>> {
    let post = state
        .store
        .post_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Post {} not found", id)))?;
    Ok(Json(AdminPostEnvelope { post }))
}

/// PUT /admin/posts/:id
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<PostUpdate>,
) -> ApiResult<Json<AdminPostEnvelope>> {
    if update.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }
    let post = state.store.update_post(id, update).await?;
    info!(slug = %post.slug, "Admin updated post {}", id);
    Ok(Json(AdminPostEnvelope { post }))
}

/// DELETE /admin/posts/:id
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    state.store.delete_post(id).await?;
    info!("Admin deleted post {}", id);
    Ok(Json(json!({ "success": true })))
}

/// GET /admin/niches
pub async fn list_all_niches(State(state): State<AppState>) -> ApiResult<Json<NichesEnvelope>> {
    let niches = state.store.all_niches().await?;
    Ok(Json(NichesEnvelope { niches }))
}

/// PUT /admin/niches/:id/toggle
pub async fn toggle_niche(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<NicheEnvelope>> {
    let niche = state.store.toggle_niche(&id).await?;
    info!(niche = %niche.id, "Admin set niche active={}", niche.is_active);
    Ok(Json(NicheEnvelope { niche }))
}

/// POST /admin/generate
pub async fn generate(
    State(state): State<AppState>,
    body: Option<Json<GenerateRequest>>,
) -> ApiResult<(StatusCode, Json<GeneratedPost>)> {
    let generator = generator(&state)?;
    let request = body.map(|Json(b)| b).unwrap_or_default();

    let generated = generator.generate(request.niche.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(generated)))
}

/// POST /admin/generate-batch
pub async fn generate_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> ApiResult<Json<BatchReport>> {
    let generator = generator(&state)?;
    let count = request.count.clamp(1, MAX_ADMIN_BATCH);

    let report = run_batch(&generator, count, request.niche.as_deref(), state.batch_delay).await;
    Ok(Json(report))
}

/// POST /admin/draft
pub async fn draft(
    State(state): State<AppState>,
    Json(request): Json<DraftRequest>,
) -> ApiResult<Json<PromptDraft>> {
    let generator = generator(&state)?;
    let draft = generator
        .draft_from_prompt(&request.prompt, request.market)
        .await?;
    Ok(Json(draft))
}

/// GET /admin/images?q=&per_page=
///
/// Candidate hero images for the post editor.
pub async fn search_images(
    State(state): State<AppState>,
    Query(params): Query<ImageSearchParams>,
) -> ApiResult<Json<ImagesEnvelope>> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("q is required".to_string()));
    }
    let generator = generator(&state)?;
    let per_page = params
        .per_page
        .unwrap_or(DEFAULT_IMAGE_RESULTS)
        .clamp(1, MAX_IMAGE_RESULTS);

    let images = generator.images().search_images(query, per_page).await;
    Ok(Json(ImagesEnvelope { images }))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/posts", get(list_posts).post(create_post))
        .route(
            "/admin/posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/admin/niches", get(list_all_niches))
        .route("/admin/niches/:id/toggle", put(toggle_niche))
        .route("/admin/generate", post(generate))
        .route("/admin/generate-batch", post(generate_batch))
        .route("/admin/draft", post(draft))
        .route("/admin/images", get(search_images))
}
