//! Public post endpoints

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use infobytes_common::models::{CategoryPage, Post, PostPage, PostQuery, PostStatus};
use infobytes_common::pagination::DEFAULT_RECENT_LIMIT;
use infobytes_common::store::RELATED_POSTS_LIMIT;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{ApiError, ApiResult, AppState};

/// Largest `limit` accepted by the recent listing
const MAX_RECENT_LIMIT: i64 = 100;

#[derive(Debug, Serialize)]
pub struct PostEnvelope {
    pub post: Option<Post>,
}

#[derive(Debug, Serialize)]
pub struct PostsEnvelope {
    pub posts: Vec<Post>,
}

#[derive(Debug, Serialize)]
pub struct SlugsEnvelope {
    pub slugs: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub related: Vec<Post>,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
}

/// GET /posts/featured
pub async fn featured_post(State(state): State<AppState>) -> ApiResult<Json<PostEnvelope>> {
    let post = state.store.featured_post().await?;
    Ok(Json(PostEnvelope { post }))
}

/// GET /posts/recent?limit=
pub async fn recent_posts(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Json<PostsEnvelope>> {
    let limit = params
        .limit
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .min(MAX_RECENT_LIMIT);
    let posts = state.store.recent_posts(limit).await?;
    Ok(Json(PostsEnvelope { posts }))
}

/// GET /posts/all-slugs
pub async fn all_slugs(State(state): State<AppState>) -> ApiResult<Json<SlugsEnvelope>> {
    let slugs = state.store.all_slugs().await?;
    Ok(Json(SlugsEnvelope { slugs }))
}

/// GET /posts/by-category/:niche?page=
pub async fn posts_by_category(
    State(state): State<AppState>,
    Path(niche): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<CategoryPage>> {
    let page = state
        .store
        .posts_by_category(&niche, params.page.unwrap_or(1))
        .await?;
    Ok(Json(page))
}

/// GET /posts/:slug
///
/// Counts one view; the response carries the pre-increment count.
pub async fn post_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<PostDetail>> {
    let (post, related) = state
        .store
        .post_detail(&slug, RELATED_POSTS_LIMIT)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Post '{}' not found", slug)))?;

    if let Err(e) = state.store.record_view(post.id).await {
        warn!(slug = %slug, "Failed to record view: {}", e);
    }

    Ok(Json(PostDetail { post, related }))
}

/// GET /posts?q&niche&market&page&limit
///
/// Published posts only, whatever `status` asks for. Drafts are listed
/// through `/admin/posts`.
pub async fn search_posts(
    State(state): State<AppState>,
    Query(mut query): Query<PostQuery>,
) -> ApiResult<Json<PostPage>> {
    query.status = Some(PostStatus::Published);
    let page = state.store.search_posts(&query).await?;
    Ok(Json(page))
}

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(search_posts))
        .route("/posts/featured", get(featured_post))
        .route("/posts/recent", get(recent_posts))
        .route("/posts/all-slugs", get(all_slugs))
        .route("/posts/by-category/:niche", get(posts_by_category))
        .route("/posts/:slug", get(post_by_slug))
}
