//! Blog storage backends
//!
//! The web service talks to a [`BlogStore`]; which implementation backs it is
//! decided at startup from the configured backend mode:
//! - [`SqliteStore`]: the local database in the root folder
//! - [`RemoteStore`]: a remote service exposing the same JSON API

mod remote;
mod sqlite;

pub use remote::{RemoteStore, ADMIN_PASSWORD_HEADER};
pub use sqlite::{NicheCount, PostSummary, SqliteStore};

use crate::config::BackendMode;
use crate::models::{CategoryPage, NewPost, Niche, Post, PostPage, PostQuery, PostUpdate, Stats};
use crate::Result;
use async_trait::async_trait;

/// Number of related posts shown under an article
pub const RELATED_POSTS_LIMIT: i64 = 4;

/// Read and admin operations shared by both backends
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Which backend this is
    fn kind(&self) -> BackendMode;

    /// Most viewed published post, newest first among equals
    async fn featured_post(&self) -> Result<Option<Post>>;

    /// Newest published posts
    async fn recent_posts(&self, limit: i64) -> Result<Vec<Post>>;

    /// Published post by slug
    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// Newest published posts of the same niche, excluding `post`
    async fn related_posts(&self, post: &Post, limit: i64) -> Result<Vec<Post>>;

    /// Published post by slug with up to `related_limit` related posts
    ///
    /// Backends that serve both in one response override this so a page view
    /// is a single read.
    async fn post_detail(&self, slug: &str, related_limit: i64) -> Result<Option<(Post, Vec<Post>)>> {
        let Some(post) = self.post_by_slug(slug).await? else {
            return Ok(None);
        };
        let related = self.related_posts(&post, related_limit).await?;
        Ok(Some((post, related)))
    }

    /// One page of a niche's published posts; unknown niche gives an empty page
    async fn posts_by_category(&self, niche_id: &str, page: i64) -> Result<CategoryPage>;

    /// Slugs of every published post
    async fn all_slugs(&self) -> Result<Vec<String>>;

    /// Filtered, paginated listing (any status unless filtered)
    async fn search_posts(&self, query: &PostQuery) -> Result<PostPage>;

    /// Active niches with post counts, highest CPC first
    async fn niches(&self) -> Result<Vec<Niche>>;

    async fn stats(&self) -> Result<Stats>;

    /// Count one view of a post
    async fn record_view(&self, id: i64) -> Result<()>;

    async fn post_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Create a post; a taken slug is `Error::Conflict`
    async fn create_post(&self, post: NewPost) -> Result<Post>;

    /// Apply a partial update; unknown id is `Error::NotFound`
    async fn update_post(&self, id: i64, update: PostUpdate) -> Result<Post>;

    async fn delete_post(&self, id: i64) -> Result<()>;

    /// Every niche including inactive ones
    async fn all_niches(&self) -> Result<Vec<Niche>>;

    /// Flip a niche's active flag and return its new state
    async fn toggle_niche(&self, id: &str) -> Result<Niche>;
}
