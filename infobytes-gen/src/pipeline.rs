//! Post generation pipeline
//!
//! One run: pick niche → topic → hero image → article → unique slug →
//! persist → generation log. A failure at any step is written to the
//! generation log before it is returned.

use crate::ai::{parse_json_reply, TextGenerator};
use crate::config::GeneratorSettings;
use crate::images::{ImagePicker, PexelsClient};
use crate::niche_select::pick_niche;
use crate::prompts::{
    content_prompt, from_request_prompt, topic_prompt, DateContext, DraftReply, Topic,
    MAX_AVOID_TITLES,
};
use crate::{GenerationError, Result};
use chrono::NaiveDate;
use infobytes_common::models::{GenerationStatus, Market, NewPost, Niche, Post, PostStatus};
use infobytes_common::store::{BlogStore, SqliteStore};
use infobytes_common::text::{dedupe_suffix, reading_time, sanitize_slug, slugify, word_count, MAX_SLUG_LEN};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Topic recorded in the log when a run fails before a topic exists
const UNKNOWN_TOPIC: &str = "unknown";

/// Suffixed slugs tried before giving up
const SLUG_SUFFIX_ATTEMPTS: u64 = 16;

/// Source of "today" and of slug suffix timestamps
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
    fn unix_millis(&self) -> u64;
}

/// Wall clock in local time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    fn unix_millis(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// A published post and its article length
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPost {
    pub post: Post,
    pub word_count: usize,
}

/// AI-written post proposal for the admin editor; not persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDraft {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub tags: Vec<String>,
    pub niche_id: Option<String>,
    pub market: Market,
    pub image_url: String,
    pub image_alt: String,
    pub reading_time: i64,
    pub word_count: usize,
}

/// What a run got to before failing
#[derive(Default)]
struct Progress {
    niche_id: Option<String>,
    topic: Option<String>,
}

pub struct PostGenerator {
    store: SqliteStore,
    text: Arc<dyn TextGenerator>,
    images: ImagePicker,
    clock: Arc<dyn Clock>,
}

impl PostGenerator {
    pub fn new(store: SqliteStore, text: Arc<dyn TextGenerator>, images: ImagePicker) -> Self {
        Self {
            store,
            text,
            images,
            clock: Arc::new(SystemClock),
        }
    }

    /// Wire up Gemini and (when keyed) Pexels from resolved settings
    pub fn from_settings(store: SqliteStore, settings: &GeneratorSettings) -> Result<Self> {
        let text: Arc<dyn TextGenerator> = Arc::new(crate::ai::GeminiClient::new(
            settings.gemini_api_key.clone(),
            Some(settings.model.clone()),
        )?);

        let search = settings
            .pexels_api_key
            .as_deref()
            .and_then(PexelsClient::new)
            .map(|c| Arc::new(c) as Arc<dyn crate::images::ImageSearch>);
        if search.is_none() {
            info!("PEXELS_API_KEY not set; hero images come from the curated Unsplash set");
        }

        let images = ImagePicker::new(Some(text.clone()), search);
        Ok(Self::new(store, text, images))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn images(&self) -> &ImagePicker {
        &self.images
    }

    /// Generate and publish one post
    ///
    /// `requested_niche` must be an active niche id; without it a niche is
    /// drawn by weighted selection.
    pub async fn generate(&self, requested_niche: Option<&str>) -> Result<GeneratedPost> {
        let mut progress = Progress::default();

        match self.run(requested_niche, &mut progress).await {
            Ok(generated) => {
                if let Err(e) = self
                    .store
                    .log_generation(
                        generated.post.niche_id.as_deref(),
                        &generated.post.title,
                        GenerationStatus::Success,
                        None,
                    )
                    .await
                {
                    warn!("Failed to write generation log: {}", e);
                }
                info!(
                    slug = %generated.post.slug,
                    "Published: /post/{} ({} words, {} min read)",
                    generated.post.slug,
                    generated.word_count,
                    generated.post.reading_time
                );
                Ok(generated)
            }
            Err(e) => {
                error!("Generation failed: {}", e);
                let topic = progress.topic.as_deref().unwrap_or(UNKNOWN_TOPIC);
                if let Err(log_err) = self
                    .store
                    .log_generation(
                        progress.niche_id.as_deref(),
                        topic,
                        GenerationStatus::Failed,
                        Some(&e.to_string()),
                    )
                    .await
                {
                    warn!("Failed to write generation log: {}", log_err);
                }
                Err(e)
            }
        }
    }

    async fn run(&self, requested: Option<&str>, progress: &mut Progress) -> Result<GeneratedPost> {
        let niche = pick_niche(&self.store, requested).await?;
        progress.niche_id = Some(niche.id.clone());
        info!(niche = %niche.id, "Generating post for niche: {}", niche.name);

        let existing = self
            .store
            .recent_titles(&niche.id, MAX_AVOID_TITLES as i64)
            .await?;

        let date = DateContext::for_date(self.clock.today());
        let topic = self.generate_topic(&niche, &existing, &date).await?;
        progress.topic = Some(topic.title.clone());
        info!(niche = %niche.id, "Title: {}", topic.title);

        let image_query = topic
            .image_query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .unwrap_or(&topic.keyword);
        let image = self.images.hero_image(image_query).await;

        info!(niche = %niche.id, "Writing article");
        let content = self
            .text
            .generate(&content_prompt(
                &topic,
                &niche,
                topic.audience(niche.market),
                &date,
            ))
            .await?;
        let words = word_count(&content);

        let slug = self.unique_slug(&topic).await?;
        let excerpt = topic.excerpt.clone().filter(|e| !e.trim().is_empty());
        let tags = topic
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        let image_alt = if image.alt.trim().is_empty() {
            topic.title.clone()
        } else {
            image.alt
        };

        let post = self
            .store
            .insert_generated_post(NewPost {
                title: topic.title.clone(),
                slug: Some(slug),
                meta_title: Some(topic.title.clone()),
                meta_description: excerpt.clone().or_else(|| Some(topic.title.clone())),
                excerpt,
                reading_time: Some(reading_time(&content)),
                content,
                niche_id: Some(niche.id.clone()),
                tags: (!tags.is_empty()).then_some(tags),
                image_url: Some(image.url),
                image_alt: Some(image_alt),
                status: Some(PostStatus::Published),
                market: Some(niche.market),
                ..Default::default()
            })
            .await?;

        Ok(GeneratedPost {
            post,
            word_count: words,
        })
    }

    async fn generate_topic(
        &self,
        niche: &Niche,
        existing: &[String],
        date: &DateContext,
    ) -> Result<Topic> {
        let reply = self
            .text
            .generate(&topic_prompt(niche, existing, niche.market, date))
            .await?;
        let topic: Topic = parse_json_reply(&reply)?;
        if topic.title.trim().is_empty() {
            return Err(GenerationError::Parse("topic reply has no title".to_string()));
        }
        Ok(Topic {
            title: topic.title.trim().to_string(),
            ..topic
        })
    }

    /// Sanitized topic slug, suffixed when already taken
    async fn unique_slug(&self, topic: &Topic) -> Result<String> {
        let slug = proposed_slug(&topic.slug, &topic.title);
        if slug.is_empty() {
            return Err(GenerationError::Parse(
                "topic has no usable slug or title".to_string(),
            ));
        }

        if !self.store.slug_exists(&slug).await? {
            return Ok(slug);
        }

        let millis = self.clock.unix_millis();
        for offset in 0..SLUG_SUFFIX_ATTEMPTS {
            let candidate = dedupe_suffix(&slug, millis + offset);
            if !self.store.slug_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(GenerationError::Store(infobytes_common::Error::Conflict(format!(
            "no free slug for '{}'",
            slug
        ))))
    }

    /// Admin AI assist: write a post from a free-form request
    pub async fn draft_from_prompt(&self, prompt: &str, market: Market) -> Result<PromptDraft> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::InvalidInput("prompt is required".to_string()));
        }

        let date = DateContext::for_date(self.clock.today());
        let reply = self
            .text
            .generate(&from_request_prompt(prompt, market, &date))
            .await?;
        let draft: DraftReply = parse_json_reply(&reply)?;
        if draft.title.trim().is_empty() || draft.content.trim().is_empty() {
            return Err(GenerationError::Parse(
                "draft reply is missing title or content".to_string(),
            ));
        }

        let known_niches = self.store.all_niches().await?;
        let niche_id = draft
            .niche_id
            .filter(|id| known_niches.iter().any(|n| &n.id == id));

        let image_query = draft
            .image_query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .unwrap_or(&draft.title);
        let image = self.images.hero_image(image_query).await;

        Ok(PromptDraft {
            slug: proposed_slug(&draft.slug, &draft.title),
            title: draft.title.trim().to_string(),
            excerpt: draft.excerpt.filter(|e| !e.trim().is_empty()),
            reading_time: reading_time(&draft.content),
            word_count: word_count(&draft.content),
            content: draft.content,
            tags: draft
                .tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            niche_id,
            market,
            image_url: image.url,
            image_alt: image.alt,
        })
    }
}

/// Model slug cleaned up, or the slugified title when the model gave none
fn proposed_slug(raw: &str, title: &str) -> String {
    let slug = sanitize_slug(raw);
    let slug = slug.trim_matches('-');
    if !slug.is_empty() {
        return slug.to_string();
    }
    slugify(title).chars().take(MAX_SLUG_LEN).collect()
}
