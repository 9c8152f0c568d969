//! Key-value settings table accessors

use crate::config::{env_value, resolve_secret, TomlConfig, ADMIN_PASSWORD_ENV};
use crate::Result;
use sqlx::SqlitePool;

pub const GEMINI_API_KEY: &str = "gemini_api_key";
pub const PEXELS_API_KEY: &str = "pexels_api_key";
pub const ADMIN_PASSWORD: &str = "admin_password";

/// Read a setting; `None` when absent or NULL
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    Ok(value.flatten())
}

/// Insert or replace a setting
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at)
        VALUES (?, ?, datetime('now'))
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Admin password: settings table → `ADMIN_PASSWORD` → TOML `[admin] password`
///
/// Without a local database (remote backend) only the last two apply.
pub async fn resolve_admin_password(
    pool: Option<&SqlitePool>,
    toml: &TomlConfig,
) -> Result<Option<String>> {
    let db_value = match pool {
        Some(pool) => get_setting(pool, ADMIN_PASSWORD).await?,
        None => None,
    };
    Ok(resolve_secret(
        ADMIN_PASSWORD_ENV,
        db_value,
        env_value(ADMIN_PASSWORD_ENV),
        toml.admin.password.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    #[tokio::test]
    async fn test_setting_upsert() {
        let pool = connect_in_memory().await.unwrap();

        assert_eq!(get_setting(&pool, GEMINI_API_KEY).await.unwrap(), None);

        set_setting(&pool, GEMINI_API_KEY, "first").await.unwrap();
        set_setting(&pool, GEMINI_API_KEY, "second").await.unwrap();

        assert_eq!(
            get_setting(&pool, GEMINI_API_KEY).await.unwrap().as_deref(),
            Some("second")
        );
    }
}
