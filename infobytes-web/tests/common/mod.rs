//! Shared setup for infobytes-web integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use infobytes_common::db::connect_in_memory;
use infobytes_common::models::{NewPost, Post, PostStatus};
use infobytes_common::store::{BlogStore, SqliteStore};
use infobytes_gen::ai::TextGenerator;
use infobytes_gen::images::ImagePicker;
use infobytes_gen::PostGenerator;
use infobytes_web::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub const PASSWORD: &str = "letmein";

/// In-memory database with the default niches
pub async fn seeded_store() -> SqliteStore {
    let store = SqliteStore::new(connect_in_memory().await.unwrap());
    infobytes_gen::seed::seed_niches(&store).await.unwrap();
    store
}

pub async fn add_post(store: &SqliteStore, title: &str, niche: &str, status: PostStatus) -> Post {
    store
        .create_post(NewPost {
            title: title.to_string(),
            content: "Body text ".repeat(300),
            excerpt: Some(format!("About {}", title)),
            niche_id: Some(niche.to_string()),
            tags: Some("alpha, beta".to_string()),
            status: Some(status),
            ..Default::default()
        })
        .await
        .unwrap()
}

pub fn app(store: &SqliteStore, password: Option<&str>) -> Router {
    build_router(AppState::new(Arc::new(store.clone()), password))
}

pub fn app_with_generator(store: &SqliteStore) -> Router {
    let generator = PostGenerator::new(
        store.clone(),
        Arc::new(CannedModel),
        ImagePicker::new(None, None),
    );
    let state = AppState::new(Arc::new(store.clone()), Some(PASSWORD))
        .with_generator(Arc::new(generator), Duration::ZERO);
    build_router(state)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Admin request carrying the test password
pub fn admin(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    admin_with(method, uri, Some(PASSWORD), body)
}

pub fn admin_with(
    method: &str,
    uri: &str,
    password: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(password) = password {
        builder = builder.header("x-admin-password", password);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Replies to topic prompts with a fixed topic and to everything else
/// with a fixed article
pub struct CannedModel;

#[async_trait]
impl TextGenerator for CannedModel {
    fn model(&self) -> &str {
        "canned"
    }

    async fn generate(&self, prompt: &str) -> infobytes_gen::Result<String> {
        if prompt.contains("USER REQUEST:") {
            return Ok(json!({
                "title": "Prompted Draft",
                "slug": "prompted-draft",
                "excerpt": "From a prompt.",
                "content": "draft ".repeat(400),
                "tags": ["draft"],
                "niche_id": "no-such-niche",
                "imageQuery": "desk"
            })
            .to_string());
        }
        if prompt.contains("Generate a blog post topic") {
            return Ok(json!({
                "title": "Crypto Basics Explained",
                "slug": "crypto-basics-explained",
                "keyword": "crypto basics",
                "excerpt": "Start here.",
                "tags": ["crypto", "basics"],
                "imageQuery": "bitcoin",
                "market": "global"
            })
            .to_string());
        }
        Ok("## Intro\n\n".to_string() + &"word ".repeat(1200))
    }
}
