//! Blog store backed by a remote HTTP service
//!
//! Reads degrade to empty results when the backend answers with an error
//! status, so a flaky backend shows an empty page rather than a failure.
//! Transport errors (connection refused, timeouts) still propagate.

use super::BlogStore;
use crate::config::BackendMode;
use crate::models::{CategoryPage, NewPost, Niche, Post, PostPage, PostQuery, PostUpdate, Stats};
use crate::pagination::DEFAULT_RECENT_LIMIT;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// Header carrying the admin password on admin calls
pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct PostEnvelope {
    #[serde(default)]
    post: Option<Post>,
}

#[derive(Deserialize)]
struct PostDetail {
    #[serde(default)]
    post: Option<Post>,
    #[serde(default)]
    related: Vec<Post>,
}

#[derive(Deserialize)]
struct PostsEnvelope {
    #[serde(default)]
    posts: Vec<Post>,
}

#[derive(Deserialize)]
struct SlugsEnvelope {
    #[serde(default)]
    slugs: Vec<String>,
}

#[derive(Deserialize)]
struct NichesEnvelope {
    #[serde(default)]
    niches: Vec<Niche>,
}

#[derive(Deserialize)]
struct NicheEnvelope {
    niche: Niche,
}

#[derive(Clone)]
pub struct RemoteStore {
    client: Client,
    base_url: String,
    admin_password: Option<String>,
}

impl RemoteStore {
    /// `base_url` is the API root, e.g. `https://host/api/blog`
    pub fn new(base_url: impl Into<String>, admin_password: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("infobytes/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| Error::Config(format!("Invalid API URL '{}': {}", base_url, e)))?;

        Ok(Self {
            client,
            base_url,
            admin_password,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL plus percent-encoded path segments
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("Invalid API URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("API URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a public endpoint; `None` when the backend answers non-2xx
    async fn get_json<T, Q>(&self, segments: &[&str], query: Option<&Q>) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(segments)?;
        let mut request = self.client.get(url.clone());
        if let Some(query) = query {
            request = request.query(query);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            error!("{}", api_log_line(status, &url));
            return Ok(None);
        }

        debug!("{}", api_log_line(status, &url));
        Ok(Some(response.json::<T>().await?))
    }

    /// Call an admin endpoint; error statuses become domain errors
    async fn admin_json<T, B>(&self, method: Method, segments: &[&str], body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let password = self.admin_password.as_deref().ok_or_else(|| {
            Error::Config("admin password is not configured for the remote backend".to_string())
        })?;

        let url = self.url(segments)?;
        let mut request = self
            .client
            .request(method, url.clone())
            .header(ADMIN_PASSWORD_HEADER, password);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        error!("{}", api_log_line(status, &url));
        let message = error_message(&response.text().await.unwrap_or_default())
            .unwrap_or_else(|| status.to_string());
        Err(match status {
            StatusCode::NOT_FOUND => Error::NotFound(message),
            StatusCode::CONFLICT => Error::Conflict(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Error::InvalidInput(message)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Error::Config(format!("remote backend rejected admin password: {}", message))
            }
            _ => Error::Internal(format!("remote backend error: {}", message)),
        })
    }

    async fn fetch_detail(&self, slug: &str) -> Result<Option<PostDetail>> {
        self.get_json::<PostDetail, ()>(&["posts", slug], None).await
    }
}

/// Request log line: `[API] <status> — <url>`
fn api_log_line(status: StatusCode, url: &Url) -> String {
    format!("[API] {} \u{2014} {}", status.as_u16(), url)
}

/// Pull a message out of `{"error": "..."}` or `{"error": {"message": "..."}}`
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let err = value.get("error")?;
    err.as_str()
        .map(str::to_string)
        .or_else(|| err.get("message")?.as_str().map(str::to_string))
}

#[async_trait]
impl BlogStore for RemoteStore {
    fn kind(&self) -> BackendMode {
        BackendMode::Remote
    }

    async fn featured_post(&self) -> Result<Option<Post>> {
        Ok(self
            .get_json::<PostEnvelope, ()>(&["posts", "featured"], None)
            .await?
            .and_then(|e| e.post))
    }

    async fn recent_posts(&self, limit: i64) -> Result<Vec<Post>> {
        let limit = if limit > 0 { limit } else { DEFAULT_RECENT_LIMIT };
        Ok(self
            .get_json::<PostsEnvelope, _>(&["posts", "recent"], Some(&[("limit", limit)]))
            .await?
            .map(|e| e.posts)
            .unwrap_or_default())
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        Ok(self.fetch_detail(slug).await?.and_then(|d| d.post))
    }

    /// Costs a detail fetch of its own; page handlers use `post_detail`
    async fn related_posts(&self, post: &Post, limit: i64) -> Result<Vec<Post>> {
        let mut related = self
            .fetch_detail(&post.slug)
            .await?
            .map(|d| d.related)
            .unwrap_or_default();
        related.truncate(limit.max(0) as usize);
        Ok(related)
    }

    async fn post_detail(&self, slug: &str, related_limit: i64) -> Result<Option<(Post, Vec<Post>)>> {
        let Some(PostDetail { post: Some(post), mut related }) = self.fetch_detail(slug).await?
        else {
            return Ok(None);
        };
        related.truncate(related_limit.max(0) as usize);
        Ok(Some((post, related)))
    }

    async fn posts_by_category(&self, niche_id: &str, page: i64) -> Result<CategoryPage> {
        Ok(self
            .get_json::<CategoryPage, _>(
                &["posts", "by-category", niche_id],
                Some(&[("page", page.max(1))]),
            )
            .await?
            .unwrap_or_else(|| CategoryPage {
                page: 1,
                ..Default::default()
            }))
    }

    async fn all_slugs(&self) -> Result<Vec<String>> {
        Ok(self
            .get_json::<SlugsEnvelope, ()>(&["posts", "all-slugs"], None)
            .await?
            .map(|e| e.slugs)
            .unwrap_or_default())
    }

    async fn search_posts(&self, query: &PostQuery) -> Result<PostPage> {
        Ok(self
            .get_json::<PostPage, _>(&["posts"], Some(query))
            .await?
            .unwrap_or_else(|| PostPage {
                page: 1,
                ..Default::default()
            }))
    }

    async fn niches(&self) -> Result<Vec<Niche>> {
        Ok(self
            .get_json::<NichesEnvelope, ()>(&["niches"], None)
            .await?
            .map(|e| e.niches)
            .unwrap_or_default())
    }

    async fn stats(&self) -> Result<Stats> {
        Ok(self
            .get_json::<Stats, ()>(&["stats"], None)
            .await?
            .unwrap_or_default())
    }

    /// The remote backend counts views when it serves the post
    async fn record_view(&self, _id: i64) -> Result<()> {
        Ok(())
    }

    async fn post_by_id(&self, id: i64) -> Result<Option<Post>> {
        let id = id.to_string();
        match self
            .admin_json::<PostEnvelope, ()>(Method::GET, &["admin", "posts", &id], None)
            .await
        {
            Ok(envelope) => Ok(envelope.post),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_post(&self, post: NewPost) -> Result<Post> {
        let post = post.normalized()?;
        self.admin_json::<PostEnvelope, _>(Method::POST, &["admin", "posts"], Some(&post))
            .await?
            .post
            .ok_or_else(|| Error::Internal("remote backend returned no post".to_string()))
    }

    async fn update_post(&self, id: i64, update: PostUpdate) -> Result<Post> {
        let id = id.to_string();
        self.admin_json::<PostEnvelope, _>(Method::PUT, &["admin", "posts", &id], Some(&update))
            .await?
            .post
            .ok_or_else(|| Error::Internal("remote backend returned no post".to_string()))
    }

    async fn delete_post(&self, id: i64) -> Result<()> {
        let id = id.to_string();
        self.admin_json::<serde_json::Value, ()>(Method::DELETE, &["admin", "posts", &id], None)
            .await?;
        Ok(())
    }

    async fn all_niches(&self) -> Result<Vec<Niche>> {
        Ok(self
            .admin_json::<NichesEnvelope, ()>(Method::GET, &["admin", "niches"], None)
            .await?
            .niches)
    }

    async fn toggle_niche(&self, id: &str) -> Result<Niche> {
        Ok(self
            .admin_json::<NicheEnvelope, ()>(Method::PUT, &["admin", "niches", id, "toggle"], None)
            .await?
            .niche)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_encodes_segments() {
        let store = RemoteStore::new("http://example.com/api/blog/", None).unwrap();
        let url = store.url(&["posts", "a b"]).unwrap();
        assert_eq!(url.as_str(), "http://example.com/api/blog/posts/a%20b");
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(error_message(r#"{"error":"nope"}"#).as_deref(), Some("nope"));
        assert_eq!(
            error_message(r#"{"error":{"code":"NOT_FOUND","message":"gone"}}"#).as_deref(),
            Some("gone")
        );
        assert_eq!(error_message("not json"), None);
    }

    #[test]
    fn test_api_log_line() {
        let url = Url::parse("http://example.com/api/blog/posts/x").unwrap();
        assert_eq!(
            api_log_line(StatusCode::NOT_FOUND, &url),
            "[API] 404 \u{2014} http://example.com/api/blog/posts/x"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(matches!(RemoteStore::new("not a url", None), Err(Error::Config(_))));
    }
}
