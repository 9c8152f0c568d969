//! Shared fakes for generator integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use infobytes_common::db::connect_in_memory;
use infobytes_common::store::SqliteStore;
use infobytes_gen::ai::TextGenerator;
use infobytes_gen::images::{HeroImage, ImagePicker, ImageSearch};
use infobytes_gen::pipeline::{Clock, PostGenerator};
use infobytes_gen::{GenerationError, Result};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const NOW_MILLIS: u64 = 1_700_000_000_000;

pub struct FixedClock;

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn unix_millis(&self) -> u64 {
        NOW_MILLIS
    }
}

/// Answers each prompt kind with a canned reply
pub struct ScriptedModel {
    pub topic: serde_json::Value,
    pub draft: serde_json::Value,
    pub article: String,
    /// Fail every article request
    pub fail_article: bool,
    pub prompts: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            topic: json!({
                "title": "Best SIP Plans for March 2026",
                "slug": "best-sip-plans-march-2026",
                "keyword": "best sip plans",
                "excerpt": "Top SIP picks this month.",
                "tags": ["sip", " mutual funds ", ""],
                "imageQuery": "investment chart",
                "market": "india"
            }),
            draft: json!({
                "title": "Why Index Funds Win",
                "slug": "Why Index Funds Win!",
                "excerpt": "Low cost beats stock picking.",
                "content": "## Intro\n\n".to_string() + &"index ".repeat(1000),
                "tags": ["index funds", "investing"],
                "niche_id": "finance",
                "imageQuery": "piggy bank"
            }),
            article: "Intro paragraph.\n\n## Section\n\n".to_string() + &"word ".repeat(1196),
            fail_article: false,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedModel {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        if prompt.contains("Unsplash-style search query") {
            return Ok("\"golden coins\"".to_string());
        }
        if prompt.contains("USER REQUEST:") {
            return Ok(format!("```json\n{}\n```", self.draft));
        }
        if prompt.contains("ALREADY PUBLISHED") || prompt.contains("Generate a blog post topic") {
            return Ok(format!("```json\n{}\n```", self.topic));
        }
        if self.fail_article {
            return Err(GenerationError::Api {
                status: 503,
                body: "model overloaded".to_string(),
            });
        }
        Ok(self.article.clone())
    }
}

/// Always returns one photo built from the query
#[derive(Default)]
pub struct FakeSearch {
    pub queries: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageSearch for FakeSearch {
    async fn search(&self, query: &str, _per_page: u32) -> Result<Vec<HeroImage>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(vec![HeroImage {
            url: format!("https://images.test/{}.jpg", query.replace(' ', "-")),
            alt: format!("photo of {}", query),
            width: 1880,
            height: 1253,
            photographer: Some("Test Photographer".to_string()),
        }])
    }
}

pub async fn seeded_store() -> SqliteStore {
    let store = SqliteStore::new(connect_in_memory().await.unwrap());
    infobytes_gen::seed::seed_niches(&store).await.unwrap();
    store
}

pub fn generator(
    store: &SqliteStore,
    model: Arc<ScriptedModel>,
    search: Arc<FakeSearch>,
) -> PostGenerator {
    let images = ImagePicker::new(Some(model.clone()), Some(search));
    PostGenerator::new(store.clone(), model, images).with_clock(Arc::new(FixedClock))
}
