//! Domain models shared by the store, the generator and the web API

use serde::{Deserialize, Deserializer, Serialize};

use crate::text::{slugify, split_tags};
use crate::{Error, Result};

/// Audience market a niche or post targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Market {
    India,
    Us,
    #[default]
    Global,
}

impl Market {
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::India => "india",
            Market::Us => "us",
            Market::Global => "global",
        }
    }

    /// Parse leniently; anything unknown is global
    pub fn parse_or_global(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "india" => Market::India,
            "us" => Market::Us,
            _ => Market::Global,
        }
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publication state of a post
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Published,
    Draft,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Published => "published",
            PostStatus::Draft => "draft",
        }
    }
}

/// Outcome recorded in the generation log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum GenerationStatus {
    Success,
    Failed,
}

/// Content category that generation rotates through
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Niche {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub avg_cpc: f64,
    /// Comma-separated seed keywords
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub market: Market,
    #[serde(default = "default_true", deserialize_with = "bool_from_int_or_bool")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
    /// Present on listings that join post counts
    #[sqlx(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_count: Option<i64>,
}

/// A blog post as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Listing endpoints of some backends omit the body
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub niche_id: Option<String>,
    /// Comma-separated tags
    #[serde(default, deserialize_with = "tags_from_string_or_list")]
    pub tags: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_alt: Option<String>,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default)]
    pub reading_time: i64,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub market: Market,
    #[serde(default, deserialize_with = "bool_from_int_or_bool")]
    pub is_trending: bool,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Post {
    /// Tags as a list
    pub fn tag_list(&self) -> Vec<String> {
        self.tags.as_deref().map(split_tags).unwrap_or_default()
    }
}

/// Input for creating a post (admin form or generator)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub content: String,
    #[serde(default)]
    pub niche_id: Option<String>,
    #[serde(default, deserialize_with = "tags_from_string_or_list")]
    pub tags: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_alt: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub reading_time: Option<i64>,
    #[serde(default)]
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub market: Option<Market>,
    #[serde(default)]
    pub is_trending: Option<bool>,
    #[serde(default)]
    pub source_url: Option<String>,
}

impl NewPost {
    /// Validate required fields and fill derived defaults
    ///
    /// - title and content must be non-blank
    /// - slug defaults to the slugified title
    /// - meta title/description default to title/excerpt
    /// - reading time is computed from the content when absent
    pub fn normalized(mut self) -> Result<Self> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput("title is required".to_string()));
        }
        if self.content.trim().is_empty() {
            return Err(Error::InvalidInput("content is required".to_string()));
        }

        let slug = match self.slug.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => slugify(s),
            _ => slugify(&self.title),
        };
        if slug.is_empty() {
            return Err(Error::InvalidInput(
                "slug could not be derived from title".to_string(),
            ));
        }
        self.slug = Some(slug);

        if blank(&self.meta_title) {
            self.meta_title = Some(self.title.clone());
        }
        if blank(&self.meta_description) {
            self.meta_description = self.excerpt.clone().or_else(|| Some(self.title.clone()));
        }
        if self.reading_time.is_none() {
            self.reading_time = Some(crate::text::reading_time(&self.content));
        }
        Ok(self)
    }
}

/// Partial update of a post; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub niche_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "tags_from_string_or_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<Market>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_trending: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl PostUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.excerpt.is_none()
            && self.content.is_none()
            && self.niche_id.is_none()
            && self.tags.is_none()
            && self.image_url.is_none()
            && self.image_alt.is_none()
            && self.author.is_none()
            && self.reading_time.is_none()
            && self.status.is_none()
            && self.meta_title.is_none()
            && self.meta_description.is_none()
            && self.market.is_none()
            && self.is_trending.is_none()
            && self.source_url.is_none()
    }
}

/// One row of the generation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GenerationLogEntry {
    pub id: i64,
    pub niche_id: Option<String>,
    pub topic: Option<String>,
    pub status: GenerationStatus,
    pub error: Option<String>,
    pub created_at: String,
}

/// Search / listing filters for posts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub niche: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<Market>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

/// A page of posts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPage {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub total: i64,
    #[serde(default = "first_page")]
    pub page: i64,
    #[serde(default)]
    pub pages: i64,
}

/// A page of posts within one niche
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryPage {
    #[serde(default)]
    pub niche: Option<Niche>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub total: i64,
    #[serde(default = "first_page")]
    pub page: i64,
    #[serde(default)]
    pub pages: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MarketBreakdown {
    pub market: Option<String>,
    pub count: i64,
    pub views: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NicheBreakdown {
    pub id: String,
    pub name: String,
    pub market: Option<String>,
    pub avg_cpc: f64,
    pub post_count: i64,
    pub total_views: i64,
}

/// Dashboard statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    #[serde(alias = "totalPosts")]
    pub total_posts: i64,
    #[serde(alias = "publishedPosts")]
    pub published_posts: i64,
    #[serde(alias = "draftPosts")]
    pub draft_posts: i64,
    #[serde(alias = "totalViews")]
    pub total_views: i64,
    #[serde(alias = "todayPosts")]
    pub today_posts: i64,
    #[serde(alias = "estimatedRevenue")]
    pub estimated_revenue: String,
    #[serde(alias = "marketBreakdown")]
    pub market_breakdown: Vec<MarketBreakdown>,
    #[serde(alias = "nicheBreakdown")]
    pub niche_breakdown: Vec<NicheBreakdown>,
    #[serde(alias = "recentLogs")]
    pub recent_logs: Vec<GenerationLogEntry>,
}

/// Revenue per thousand pageviews used for the estimate
const ESTIMATED_RPM: f64 = 12.0;

/// Rough monthly revenue estimate from lifetime views
///
/// Monthly pageviews are approximated as four times total views.
pub fn estimate_revenue(total_views: i64) -> String {
    let monthly_pageviews = total_views as f64 * 4.0;
    format!("{:.2}", monthly_pageviews / 1000.0 * ESTIMATED_RPM)
}

fn default_author() -> String {
    "Editorial Team".to_string()
}

fn default_true() -> bool {
    true
}

fn first_page() -> i64 {
    1
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map(|v| v.trim().is_empty()).unwrap_or(true)
}

/// Accept `true`/`false` as well as SQLite-style `0`/`1`
fn bool_from_int_or_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Null(()),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
        Flag::Null(()) => false,
    })
}

/// Accept tags as `"a, b"` or `["a", "b"]`; stored comma-joined
fn tags_from_string_or_list<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        Text(String),
        List(Vec<String>),
    }

    Ok(match Option::<Tags>::deserialize(deserializer)? {
        Some(Tags::Text(s)) => Some(s),
        Some(Tags::List(list)) => Some(
            list.iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        ),
        None => None,
    })
}
