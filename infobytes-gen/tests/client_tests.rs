//! Gemini and Pexels clients against throw-away axum servers

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use infobytes_gen::ai::{GeminiClient, TextGenerator};
use infobytes_gen::images::{ImageSearch, PexelsClient};
use infobytes_gen::GenerationError;
use serde_json::{json, Value};
use std::collections::HashMap;

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn gemini_handler(
    Path(model_call): Path<String>,
    Query(q): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if q.get("key").map(String::as_str) != Some("good-key") {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": { "message": "API key not valid" } })),
        );
    }
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default();
    if prompt == "empty" {
        return (StatusCode::OK, Json(json!({ "candidates": [] })));
    }
    (
        StatusCode::OK,
        Json(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": format!("{} says ", model_call) },
                    { "text": format!("{}\n", prompt) }
                ] }
            }]
        })),
    )
}

fn gemini_app() -> Router {
    Router::new().route("/models/:model_call", post(gemini_handler))
}

#[tokio::test]
async fn tc_gemini_concatenates_parts() {
    let base = spawn(gemini_app()).await;
    let client = GeminiClient::new(Some("good-key".into()), Some("test-model".into()))
        .unwrap()
        .with_base_url(base);

    let text = client.generate("hello").await.unwrap();
    assert_eq!(text, "test-model:generateContent says hello");
    assert_eq!(client.model(), "test-model");
}

#[tokio::test]
async fn tc_gemini_error_status_and_empty_reply() {
    let base = spawn(gemini_app()).await;

    let bad = GeminiClient::new(Some("bad-key".into()), None)
        .unwrap()
        .with_base_url(base.clone());
    match bad.generate("hello").await {
        Err(GenerationError::Api { status, body }) => {
            assert_eq!(status, 403);
            assert!(body.contains("API key not valid"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }

    let good = GeminiClient::new(Some("good-key".into()), None)
        .unwrap()
        .with_base_url(base);
    assert!(matches!(
        good.generate("empty").await,
        Err(GenerationError::EmptyResponse)
    ));
}

#[test]
fn tc_gemini_requires_real_key() {
    assert!(matches!(
        GeminiClient::new(None, None),
        Err(GenerationError::Config(_))
    ));
    assert!(matches!(
        GeminiClient::new(Some("your_gemini_api_key".into()), None),
        Err(GenerationError::Config(_))
    ));
}

async fn pexels_handler(
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("px-key") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad key" })));
    }
    assert_eq!(q.get("orientation").map(String::as_str), Some("landscape"));
    let query = q.get("query").cloned().unwrap_or_default();
    let per_page: usize = q.get("per_page").and_then(|p| p.parse().ok()).unwrap_or(1);

    let photos: Vec<Value> = (0..per_page)
        .map(|i| {
            json!({
                "width": 4000,
                "height": 2500,
                "alt": if i == 0 { Value::String(String::new()) } else { json!(format!("{} {}", query, i)) },
                "photographer": "Ana",
                "src": if i == 0 {
                    json!({ "large2x": "https://px.test/0-2x.jpg", "large": "https://px.test/0.jpg" })
                } else {
                    json!({ "original": format!("https://px.test/{}-orig.jpg", i) })
                }
            })
        })
        .collect();
    (StatusCode::OK, Json(json!({ "photos": photos })))
}

#[tokio::test]
async fn tc_pexels_search_maps_photos() {
    let base = spawn(Router::new().route("/search", get(pexels_handler))).await;
    let client = PexelsClient::new("px-key").unwrap().with_base_url(base);

    let images = client.search("city lights", 2).await.unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].url, "https://px.test/0-2x.jpg");
    assert_eq!(images[0].alt, "city lights");
    assert_eq!(images[0].photographer.as_deref(), Some("Ana"));
    assert_eq!(images[1].url, "https://px.test/1-orig.jpg");
    assert_eq!(images[1].alt, "city lights 1");
    assert_eq!((images[1].width, images[1].height), (4000, 2500));
}

#[tokio::test]
async fn tc_pexels_rejected_key_is_api_error() {
    let base = spawn(Router::new().route("/search", get(pexels_handler))).await;
    let client = PexelsClient::new("wrong").unwrap().with_base_url(base);

    assert!(matches!(
        client.search("x", 1).await,
        Err(GenerationError::Api { status: 401, .. })
    ));
}
