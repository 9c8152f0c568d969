//! Declared schemas for tables that gained columns after first release
//!
//! `posts` and `niches` were created without the market columns (and
//! `posts` without trending/source fields). Databases created then get them
//! added on startup.

use crate::db::schema_sync::{ColumnDefinition, SchemaSync, TableSchema};
use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

pub struct PostsTableSchema;

impl TableSchema for PostsTableSchema {
    fn table_name() -> &'static str {
        "posts"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "INTEGER").primary_key(),
            ColumnDefinition::new("slug", "TEXT").not_null().unique(),
            ColumnDefinition::new("title", "TEXT").not_null(),
            ColumnDefinition::new("excerpt", "TEXT"),
            ColumnDefinition::new("content", "TEXT").not_null(),
            ColumnDefinition::new("niche_id", "TEXT"),
            ColumnDefinition::new("tags", "TEXT"),
            ColumnDefinition::new("image_url", "TEXT"),
            ColumnDefinition::new("image_alt", "TEXT"),
            ColumnDefinition::new("author", "TEXT").default("'Editorial Team'"),
            ColumnDefinition::new("reading_time", "INTEGER").default("5"),
            ColumnDefinition::new("status", "TEXT").default("'published'"),
            ColumnDefinition::new("meta_title", "TEXT"),
            ColumnDefinition::new("meta_description", "TEXT"),
            ColumnDefinition::new("views", "INTEGER").default("0"),
            ColumnDefinition::new("created_at", "TEXT"),
            ColumnDefinition::new("updated_at", "TEXT"),
            // Late additions
            ColumnDefinition::new("market", "TEXT").default("'global'"),
            ColumnDefinition::new("is_trending", "INTEGER").default("0"),
            ColumnDefinition::new("source_url", "TEXT"),
        ]
    }
}

pub struct NichesTableSchema;

impl TableSchema for NichesTableSchema {
    fn table_name() -> &'static str {
        "niches"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "TEXT").primary_key(),
            ColumnDefinition::new("name", "TEXT").not_null(),
            ColumnDefinition::new("description", "TEXT"),
            ColumnDefinition::new("avg_cpc", "REAL").default("0"),
            ColumnDefinition::new("keywords", "TEXT"),
            ColumnDefinition::new("is_active", "INTEGER").default("1"),
            ColumnDefinition::new("created_at", "TEXT"),
            ColumnDefinition::new("market", "TEXT").default("'global'"),
        ]
    }
}

/// Add any missing columns to `niches` and `posts`
pub async fn sync_all_table_schemas(pool: &SqlitePool) -> Result<()> {
    let mut added = SchemaSync::sync_table::<NichesTableSchema>(pool).await?;
    added.extend(SchemaSync::sync_table::<PostsTableSchema>(pool).await?);

    if !added.is_empty() {
        info!("Schema sync added {} column(s): {}", added.len(), added.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema_sync::SchemaIntrospector;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[test]
    fn test_posts_schema_declares_late_columns() {
        let columns = PostsTableSchema::expected_columns();
        assert!(columns.iter().any(|c| c.name == "slug" && c.not_null && c.unique));
        assert!(columns
            .iter()
            .any(|c| c.name == "market" && c.default_value.as_deref() == Some("'global'")));
        assert!(columns.iter().any(|c| c.name == "is_trending"));
        assert!(columns.iter().any(|c| c.name == "source_url"));
    }

    #[tokio::test]
    async fn test_first_release_tables_are_upgraded() {
        let pool = setup_test_db().await;
        sqlx::query(
            "CREATE TABLE niches (id TEXT PRIMARY KEY, name TEXT NOT NULL, description TEXT,
             avg_cpc REAL DEFAULT 0, keywords TEXT, is_active INTEGER DEFAULT 1, created_at TEXT)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "CREATE TABLE posts (id INTEGER PRIMARY KEY AUTOINCREMENT, slug TEXT UNIQUE NOT NULL,
             title TEXT NOT NULL, excerpt TEXT, content TEXT NOT NULL, niche_id TEXT, tags TEXT,
             image_url TEXT, image_alt TEXT, author TEXT DEFAULT 'Editorial Team',
             reading_time INTEGER DEFAULT 5, status TEXT DEFAULT 'published', meta_title TEXT,
             meta_description TEXT, views INTEGER DEFAULT 0, created_at TEXT, updated_at TEXT)",
        )
        .execute(&pool)
        .await
        .unwrap();

        sync_all_table_schemas(&pool).await.unwrap();

        let niche_cols = SchemaIntrospector::introspect_table(&pool, "niches").await.unwrap();
        assert!(niche_cols.iter().any(|c| c.name == "market"));

        let post_cols = SchemaIntrospector::introspect_table(&pool, "posts").await.unwrap();
        for name in ["market", "is_trending", "source_url"] {
            assert!(post_cols.iter().any(|c| c.name == name), "missing {}", name);
        }
    }
}
