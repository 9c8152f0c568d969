//! Generator settings resolution
//!
//! API keys: database `settings` table → environment → TOML.
//! Everything else: environment → TOML → compiled default.

use crate::Result;
use infobytes_common::config::{
    env_value, resolve_secret, TomlConfig, DEFAULT_BATCH_DELAY_SECS, DEFAULT_CRON, DEFAULT_MODEL,
    DEFAULT_POSTS_PER_BATCH,
};
use infobytes_common::db::{get_setting, settings};
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::warn;

pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const PEXELS_API_KEY_ENV: &str = "PEXELS_API_KEY";
pub const GEMINI_MODEL_ENV: &str = "GEMINI_MODEL";
pub const AUTO_POST_CRON_ENV: &str = "AUTO_POST_CRON";
pub const POSTS_PER_BATCH_ENV: &str = "POSTS_PER_BATCH";

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    pub gemini_api_key: Option<String>,
    pub pexels_api_key: Option<String>,
    pub model: String,
    pub cron: String,
    pub posts_per_batch: u32,
    pub batch_delay: Duration,
}

impl GeneratorSettings {
    pub async fn resolve(pool: &SqlitePool, toml: &TomlConfig) -> Result<Self> {
        let gemini_api_key = resolve_secret(
            GEMINI_API_KEY_ENV,
            get_setting(pool, settings::GEMINI_API_KEY).await?,
            env_value(GEMINI_API_KEY_ENV),
            toml.generator.gemini_api_key.clone(),
        );
        let pexels_api_key = resolve_secret(
            PEXELS_API_KEY_ENV,
            get_setting(pool, settings::PEXELS_API_KEY).await?,
            env_value(PEXELS_API_KEY_ENV),
            toml.generator.pexels_api_key.clone(),
        );

        Ok(Self {
            gemini_api_key,
            pexels_api_key,
            ..Self::from_env_and_toml(toml)
        })
    }

    /// Non-secret settings only; keys are left unset
    pub fn from_env_and_toml(toml: &TomlConfig) -> Self {
        let model = env_value(GEMINI_MODEL_ENV)
            .or_else(|| toml.generator.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let cron = env_value(AUTO_POST_CRON_ENV)
            .or_else(|| toml.scheduler.cron.clone())
            .unwrap_or_else(|| DEFAULT_CRON.to_string());

        let posts_per_batch = match env_value(POSTS_PER_BATCH_ENV) {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    warn!("Ignoring invalid {}={}", POSTS_PER_BATCH_ENV, raw);
                    toml.scheduler.posts_per_batch.unwrap_or(DEFAULT_POSTS_PER_BATCH)
                }
            },
            None => toml.scheduler.posts_per_batch.unwrap_or(DEFAULT_POSTS_PER_BATCH),
        };

        let batch_delay = Duration::from_secs(
            toml.generator
                .batch_delay_secs
                .unwrap_or(DEFAULT_BATCH_DELAY_SECS),
        );

        Self {
            gemini_api_key: None,
            pexels_api_key: None,
            model,
            cron,
            posts_per_batch: posts_per_batch.max(1),
            batch_delay,
        }
    }
}
