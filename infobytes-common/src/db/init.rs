//! Database initialization
//!
//! Opens (creating if needed) the blog database, creates the tables, brings
//! older databases up to date, then builds indexes. Every step is idempotent.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Lock wait before SQLite reports `database is locked`
const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Open the database at `db_path` and make sure the schema is current
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Applied per connection, so every pooled connection gets WAL + FKs
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    init_schema(&pool).await?;
    Ok(pool)
}

/// Single-connection in-memory database with the full schema
///
/// The connection never expires, so the data lives as long as the pool.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Create tables, sync late columns, create indexes
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    create_niches_table(pool).await?;
    create_posts_table(pool).await?;
    create_generation_log_table(pool).await?;
    create_settings_table(pool).await?;

    // Indexes below reference columns older databases lack
    crate::db::table_schemas::sync_all_table_schemas(pool).await?;

    create_indexes(pool).await?;
    Ok(())
}

async fn create_niches_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS niches (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            avg_cpc REAL DEFAULT 0,
            keywords TEXT,
            is_active INTEGER DEFAULT 1,
            created_at TEXT DEFAULT (datetime('now')),
            market TEXT DEFAULT 'global'
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_posts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            slug TEXT UNIQUE NOT NULL,
            title TEXT NOT NULL,
            excerpt TEXT,
            content TEXT NOT NULL,
            niche_id TEXT,
            tags TEXT,
            image_url TEXT,
            image_alt TEXT,
            author TEXT DEFAULT 'Editorial Team',
            reading_time INTEGER DEFAULT 5,
            status TEXT DEFAULT 'published',
            meta_title TEXT,
            meta_description TEXT,
            views INTEGER DEFAULT 0,
            created_at TEXT DEFAULT (datetime('now')),
            updated_at TEXT DEFAULT (datetime('now')),
            market TEXT DEFAULT 'global',
            is_trending INTEGER DEFAULT 0,
            source_url TEXT,
            FOREIGN KEY (niche_id) REFERENCES niches(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_generation_log_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS generation_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            niche_id TEXT,
            topic TEXT,
            status TEXT DEFAULT 'success',
            error TEXT,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Key-value settings (API keys entered through the database)
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<()> {
    let statements = [
        "CREATE INDEX IF NOT EXISTS idx_posts_slug ON posts(slug)",
        "CREATE INDEX IF NOT EXISTS idx_posts_niche ON posts(niche_id)",
        "CREATE INDEX IF NOT EXISTS idx_posts_status ON posts(status)",
        "CREATE INDEX IF NOT EXISTS idx_posts_created ON posts(created_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_posts_market ON posts(market)",
        "CREATE INDEX IF NOT EXISTS idx_posts_trending ON posts(is_trending)",
    ];

    for sql in statements {
        sqlx::query(sql).execute(pool).await?;
    }
    Ok(())
}
