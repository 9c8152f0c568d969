//! SQLite-backed blog store
//!
//! Besides the [`BlogStore`] operations this exposes the queries the
//! generator and the maintenance commands run against the local database.

use super::BlogStore;
use crate::config::BackendMode;
use crate::models::{
    estimate_revenue, CategoryPage, GenerationLogEntry, GenerationStatus, MarketBreakdown,
    NewPost, Niche, NicheBreakdown, Post, PostPage, PostQuery, PostUpdate, Stats,
};
use crate::pagination::{calculate_pagination, clamp_limit, CATEGORY_PAGE_SIZE};
use crate::text::{reading_time, slugify};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info};

/// Post columns with NULL-safe fallbacks for rows written by older versions
const POST_COLUMNS: &str = "id, slug, title, excerpt, content, niche_id, tags, image_url, image_alt, \
     COALESCE(author, 'Editorial Team') AS author, COALESCE(reading_time, 5) AS reading_time, \
     COALESCE(status, 'published') AS status, meta_title, meta_description, \
     COALESCE(views, 0) AS views, COALESCE(market, 'global') AS market, \
     COALESCE(is_trending, 0) AS is_trending, source_url, \
     COALESCE(created_at, '') AS created_at, COALESCE(updated_at, '') AS updated_at";

const NICHE_COLUMNS: &str = "n.id, n.name, n.description, COALESCE(n.avg_cpc, 0.0) AS avg_cpc, \
     n.keywords, COALESCE(n.market, 'global') AS market, COALESCE(n.is_active, 1) AS is_active, \
     COALESCE(n.created_at, '') AS created_at";

/// Recent generation log rows shown with the stats
const STATS_LOG_LIMIT: i64 = 20;

/// Post listing row used by the maintenance report
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct PostSummary {
    pub id: i64,
    pub niche_id: Option<String>,
    pub title: String,
    pub created_at: String,
}

/// Posts per niche, all statuses
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct NicheCount {
    pub id: String,
    pub name: String,
    pub count: i64,
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Active niches in catalogue order
    pub async fn active_niches(&self) -> Result<Vec<Niche>> {
        let sql = format!(
            "SELECT {} FROM niches n WHERE n.is_active = 1 ORDER BY n.rowid",
            NICHE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Niche>(&sql).fetch_all(&self.pool).await?)
    }

    /// An active niche by id
    pub async fn active_niche(&self, id: &str) -> Result<Option<Niche>> {
        let sql = format!(
            "SELECT {} FROM niches n WHERE n.id = ? AND n.is_active = 1",
            NICHE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Niche>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn niche_by_id(&self, id: &str) -> Result<Option<Niche>> {
        let sql = format!("SELECT {} FROM niches n WHERE n.id = ?", NICHE_COLUMNS);
        Ok(sqlx::query_as::<_, Niche>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Post count per niche id, any status
    pub async fn post_counts_by_niche(&self) -> Result<HashMap<String, i64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT niche_id, COUNT(*) FROM posts WHERE niche_id IS NOT NULL GROUP BY niche_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// Newest titles of a niche, for topic de-duplication
    pub async fn recent_titles(&self, niche_id: &str, limit: i64) -> Result<Vec<String>> {
        Ok(sqlx::query_scalar(
            "SELECT title FROM posts WHERE niche_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(niche_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn slug_exists(&self, slug: &str) -> Result<bool> {
        Ok(
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE slug = ?)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    /// Insert a generated post with its slug exactly as given
    ///
    /// The caller has already made the slug unique and filled the meta fields.
    pub async fn insert_generated_post(&self, post: NewPost) -> Result<Post> {
        let slug = post
            .slug
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::InvalidInput("generated post has no slug".to_string()))?;
        self.insert_post(&post, &slug).await
    }

    /// Append a generation log row
    pub async fn log_generation(
        &self,
        niche_id: Option<&str>,
        topic: &str,
        status: GenerationStatus,
        error: Option<&str>,
    ) -> Result<()> {
        sqlx::query("INSERT INTO generation_log (niche_id, topic, status, error) VALUES (?, ?, ?, ?)")
            .bind(niche_id)
            .bind(topic)
            .bind(status)
            .bind(error)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn recent_logs(&self, limit: i64) -> Result<Vec<GenerationLogEntry>> {
        Ok(sqlx::query_as::<_, GenerationLogEntry>(
            "SELECT id, niche_id, topic, COALESCE(status, 'success') AS status, error, \
             COALESCE(created_at, '') AS created_at \
             FROM generation_log ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Insert a niche or refresh its catalogue fields; the niche is (re)activated
    ///
    /// Updates in place so posts referencing the niche stay valid.
    pub async fn upsert_niche(&self, niche: &Niche) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO niches (id, name, description, avg_cpc, keywords, market, is_active)
            VALUES (?, ?, ?, ?, ?, ?, 1)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                avg_cpc = excluded.avg_cpc,
                keywords = excluded.keywords,
                market = excluded.market,
                is_active = 1
            "#,
        )
        .bind(&niche.id)
        .bind(&niche.name)
        .bind(&niche.description)
        .bind(niche.avg_cpc)
        .bind(&niche.keywords)
        .bind(niche.market)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Copy each post's niche market onto the post; returns posts per market
    pub async fn sync_post_markets(&self) -> Result<Vec<MarketBreakdown>> {
        let result = sqlx::query(
            r#"
            UPDATE posts SET market = COALESCE(
                (SELECT market FROM niches WHERE niches.id = posts.niche_id),
                market
            )
            WHERE niche_id IS NOT NULL
            "#,
        )
        .execute(&self.pool)
        .await?;
        info!("Market sync touched {} post(s)", result.rows_affected());

        Ok(sqlx::query_as::<_, MarketBreakdown>(
            "SELECT market, COUNT(*) AS count, COALESCE(SUM(views), 0) AS views \
             FROM posts GROUP BY market ORDER BY market",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    /// Deactivate niches; returns the ids that were active before
    pub async fn deactivate_niches(&self, ids: &[String]) -> Result<Vec<String>> {
        let mut changed = Vec::new();
        for id in ids {
            let result = sqlx::query("UPDATE niches SET is_active = 0 WHERE id = ? AND is_active = 1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() > 0 {
                changed.push(id.clone());
            }
        }
        Ok(changed)
    }

    /// Every post (any status) plus post counts per niche, busiest first
    pub async fn posts_report(&self) -> Result<(Vec<PostSummary>, Vec<NicheCount>)> {
        let posts = sqlx::query_as::<_, PostSummary>(
            "SELECT id, niche_id, title, COALESCE(created_at, '') AS created_at FROM posts ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let counts = sqlx::query_as::<_, NicheCount>(
            "SELECT n.id, n.name, COUNT(p.id) AS count FROM niches n \
             LEFT JOIN posts p ON p.niche_id = n.id \
             GROUP BY n.id ORDER BY count DESC, n.id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok((posts, counts))
    }

    async fn insert_post(&self, post: &NewPost, slug: &str) -> Result<Post> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts (
                slug, title, excerpt, content, niche_id, tags, image_url, image_alt, author,
                reading_time, status, meta_title, meta_description, market, is_trending, source_url
            )
            VALUES (
                ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                COALESCE(?, (SELECT market FROM niches WHERE id = ?), 'global'),
                ?, ?
            )
            "#,
        )
        .bind(slug)
        .bind(&post.title)
        .bind(&post.excerpt)
        .bind(&post.content)
        .bind(&post.niche_id)
        .bind(&post.tags)
        .bind(&post.image_url)
        .bind(&post.image_alt)
        .bind(post.author.as_deref().unwrap_or("Editorial Team"))
        .bind(post.reading_time.unwrap_or_else(|| reading_time(&post.content)))
        .bind(post.status.unwrap_or_default())
        .bind(&post.meta_title)
        .bind(&post.meta_description)
        .bind(post.market)
        .bind(&post.niche_id)
        .bind(post.is_trending.unwrap_or(false))
        .bind(&post.source_url)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, slug))?;

        let id = result.last_insert_rowid();
        debug!(id, slug, "Post inserted");

        self.post_by_id(id)
            .await?
            .ok_or_else(|| Error::Internal(format!("post {} vanished after insert", id)))
    }
}

/// Map constraint failures to domain errors
fn write_error(err: sqlx::Error, slug: &str) -> Error {
    if Error::is_unique_violation(&err) {
        return Error::Conflict(format!("slug '{}' already exists", slug));
    }
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.message().contains("FOREIGN KEY constraint failed") {
            return Error::InvalidInput("niche_id does not name a known niche".to_string());
        }
    }
    Error::Database(err)
}

#[async_trait]
impl BlogStore for SqliteStore {
    fn kind(&self) -> BackendMode {
        BackendMode::Local
    }

    async fn featured_post(&self) -> Result<Option<Post>> {
        let sql = format!(
            "SELECT {} FROM posts WHERE status = 'published' \
             ORDER BY views DESC, created_at DESC, id DESC LIMIT 1",
            POST_COLUMNS
        );
        Ok(sqlx::query_as::<_, Post>(&sql).fetch_optional(&self.pool).await?)
    }

    async fn recent_posts(&self, limit: i64) -> Result<Vec<Post>> {
        let sql = format!(
            "SELECT {} FROM posts WHERE status = 'published' \
             ORDER BY created_at DESC, id DESC LIMIT ?",
            POST_COLUMNS
        );
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(limit.max(1))
            .fetch_all(&self.pool)
            .await?)
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let sql = format!(
            "SELECT {} FROM posts WHERE slug = ? AND status = 'published'",
            POST_COLUMNS
        );
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn related_posts(&self, post: &Post, limit: i64) -> Result<Vec<Post>> {
        let Some(niche_id) = post.niche_id.as_deref() else {
            return Ok(Vec::new());
        };
        let sql = format!(
            "SELECT {} FROM posts WHERE niche_id = ? AND id != ? AND status = 'published' \
             ORDER BY created_at DESC, id DESC LIMIT ?",
            POST_COLUMNS
        );
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(niche_id)
            .bind(post.id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn posts_by_category(&self, niche_id: &str, page: i64) -> Result<CategoryPage> {
        let Some(niche) = self.niche_by_id(niche_id).await? else {
            return Ok(CategoryPage {
                page: 1,
                ..Default::default()
            });
        };

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM posts WHERE niche_id = ? AND status = 'published'",
        )
        .bind(niche_id)
        .fetch_one(&self.pool)
        .await?;

        let pagination = calculate_pagination(total, page, CATEGORY_PAGE_SIZE);
        let sql = format!(
            "SELECT {} FROM posts WHERE niche_id = ? AND status = 'published' \
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            POST_COLUMNS
        );
        let posts = sqlx::query_as::<_, Post>(&sql)
            .bind(niche_id)
            .bind(pagination.page_size)
            .bind(pagination.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(CategoryPage {
            niche: Some(niche),
            posts,
            total,
            page: pagination.page,
            pages: pagination.total_pages,
        })
    }

    async fn all_slugs(&self) -> Result<Vec<String>> {
        Ok(sqlx::query_scalar(
            "SELECT slug FROM posts WHERE status = 'published' ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn search_posts(&self, query: &PostQuery) -> Result<PostPage> {
        fn push_filters<'a>(qb: &mut QueryBuilder<'a, Sqlite>, query: &'a PostQuery) {
            qb.push(" WHERE 1 = 1");
            if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
                let pattern = format!("%{}%", q);
                qb.push(" AND (title LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR excerpt LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR tags LIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            if let Some(niche) = query.niche.as_deref().filter(|n| !n.is_empty()) {
                qb.push(" AND niche_id = ").push_bind(niche);
            }
            if let Some(market) = query.market {
                qb.push(" AND market = ").push_bind(market);
            }
            if let Some(status) = query.status {
                qb.push(" AND status = ").push_bind(status);
            }
        }

        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM posts");
        push_filters(&mut count_qb, query);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let limit = clamp_limit(query.limit);
        let pagination = calculate_pagination(total, query.page.unwrap_or(1), limit);

        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM posts", POST_COLUMNS));
        push_filters(&mut qb, query);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(pagination.page_size)
            .push(" OFFSET ")
            .push_bind(pagination.offset);
        let posts = qb.build_query_as::<Post>().fetch_all(&self.pool).await?;

        Ok(PostPage {
            posts,
            total,
            page: pagination.page,
            pages: pagination.total_pages,
        })
    }

    async fn niches(&self) -> Result<Vec<Niche>> {
        let sql = format!(
            "SELECT {}, COUNT(p.id) AS post_count FROM niches n \
             LEFT JOIN posts p ON p.niche_id = n.id AND p.status = 'published' \
             WHERE n.is_active = 1 \
             GROUP BY n.id ORDER BY avg_cpc DESC, n.id",
            NICHE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Niche>(&sql).fetch_all(&self.pool).await?)
    }

    async fn stats(&self) -> Result<Stats> {
        let (total_posts, published_posts, draft_posts, total_views, today_posts): (
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN status = 'published' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'draft' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(views), 0),
                COALESCE(SUM(CASE WHEN date(created_at) = date('now') THEN 1 ELSE 0 END), 0)
            FROM posts
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let market_breakdown = sqlx::query_as::<_, MarketBreakdown>(
            "SELECT market, COUNT(*) AS count, COALESCE(SUM(views), 0) AS views \
             FROM posts WHERE status = 'published' GROUP BY market ORDER BY market",
        )
        .fetch_all(&self.pool)
        .await?;

        let niche_breakdown = sqlx::query_as::<_, NicheBreakdown>(
            "SELECT n.id, n.name, n.market, COALESCE(n.avg_cpc, 0.0) AS avg_cpc, \
             COUNT(p.id) AS post_count, COALESCE(SUM(p.views), 0) AS total_views \
             FROM niches n LEFT JOIN posts p ON p.niche_id = n.id \
             GROUP BY n.id ORDER BY n.market, avg_cpc DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let recent_logs = self.recent_logs(STATS_LOG_LIMIT).await?;

        Ok(Stats {
            total_posts,
            published_posts,
            draft_posts,
            total_views,
            today_posts,
            estimated_revenue: estimate_revenue(total_views),
            market_breakdown,
            niche_breakdown,
            recent_logs,
        })
    }

    async fn record_view(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE posts SET views = COALESCE(views, 0) + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn post_by_id(&self, id: i64) -> Result<Option<Post>> {
        let sql = format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS);
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_post(&self, post: NewPost) -> Result<Post> {
        let post = post.normalized()?;
        let slug = post.slug.clone().unwrap_or_default();
        let created = self.insert_post(&post, &slug).await?;
        info!(id = created.id, slug = %created.slug, "Post created");
        Ok(created)
    }

    async fn update_post(&self, id: i64, update: PostUpdate) -> Result<Post> {
        let existing = self
            .post_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("post {}", id)))?;

        if update.is_empty() {
            return Ok(existing);
        }

        if update.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(Error::InvalidInput("title cannot be blank".to_string()));
        }
        if update.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(Error::InvalidInput("content cannot be blank".to_string()));
        }
        let slug = match update.slug.as_deref() {
            Some(raw) => {
                let slug = slugify(raw);
                if slug.is_empty() {
                    return Err(Error::InvalidInput("slug cannot be blank".to_string()));
                }
                Some(slug)
            }
            None => None,
        };
        let reading_time = update
            .reading_time
            .or_else(|| update.content.as_deref().map(reading_time));

        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE posts SET updated_at = datetime('now')");
        macro_rules! set {
            ($col:literal, $value:expr) => {
                if let Some(value) = $value {
                    qb.push(concat!(", ", $col, " = ")).push_bind(value);
                }
            };
        }
        set!("title", update.title);
        set!("slug", slug.clone());
        set!("excerpt", update.excerpt);
        set!("content", update.content);
        set!("niche_id", update.niche_id);
        set!("tags", update.tags);
        set!("image_url", update.image_url);
        set!("image_alt", update.image_alt);
        set!("author", update.author);
        set!("reading_time", reading_time);
        set!("status", update.status);
        set!("meta_title", update.meta_title);
        set!("meta_description", update.meta_description);
        set!("market", update.market);
        set!("is_trending", update.is_trending);
        set!("source_url", update.source_url);
        qb.push(" WHERE id = ").push_bind(id);

        let slug_for_error = slug.unwrap_or(existing.slug);
        qb.build()
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(e, &slug_for_error))?;

        self.post_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("post {}", id)))
    }

    async fn delete_post(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("post {}", id)));
        }
        info!(id, "Post deleted");
        Ok(())
    }

    async fn all_niches(&self) -> Result<Vec<Niche>> {
        let sql = format!(
            "SELECT {}, COUNT(p.id) AS post_count FROM niches n \
             LEFT JOIN posts p ON p.niche_id = n.id \
             GROUP BY n.id ORDER BY n.market, avg_cpc DESC, n.id",
            NICHE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Niche>(&sql).fetch_all(&self.pool).await?)
    }

    async fn toggle_niche(&self, id: &str) -> Result<Niche> {
        let result = sqlx::query(
            "UPDATE niches SET is_active = CASE WHEN COALESCE(is_active, 1) = 1 THEN 0 ELSE 1 END \
             WHERE id = ?",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("niche '{}'", id)));
        }

        let niche = self
            .niche_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("niche '{}'", id)))?;
        info!(niche = %niche.id, active = niche.is_active, "Niche toggled");
        Ok(niche)
    }
}
