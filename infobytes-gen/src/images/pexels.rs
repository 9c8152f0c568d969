//! Pexels photo search client

use super::{HeroImage, ImageSearch};
use crate::{GenerationError, Result};
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use infobytes_common::config::is_valid_key;
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_PEXELS_BASE_URL: &str = "https://api.pexels.com/v1";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    alt: Option<String>,
    #[serde(default)]
    photographer: Option<String>,
    src: PhotoSources,
}

#[derive(Debug, Deserialize)]
struct PhotoSources {
    large2x: Option<String>,
    large: Option<String>,
    original: Option<String>,
}

pub struct PexelsClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    /// Two requests per second keeps batches well inside the hourly quota
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl PexelsClient {
    /// `None` when the key is missing or a placeholder
    pub fn new(api_key: &str) -> Option<Self> {
        if !is_valid_key(api_key) {
            return None;
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .ok()?;

        let rate_limiter =
            RateLimiter::direct(Quota::per_second(NonZeroU32::new(2).expect("2 is non-zero")));

        Some(Self {
            http_client,
            api_key: api_key.trim().to_string(),
            base_url: DEFAULT_PEXELS_BASE_URL.to_string(),
            rate_limiter,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ImageSearch for PexelsClient {
    async fn search(&self, query: &str, per_page: u32) -> Result<Vec<HeroImage>> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/search", self.base_url);
        let per_page = per_page.max(1).to_string();
        let response = self
            .http_client
            .get(&url)
            .header("Authorization", &self.api_key)
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("orientation", "landscape"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let data: SearchResponse = response.json().await?;
        debug!("[Images] Pexels returned {} photo(s) for '{}'", data.photos.len(), query);

        Ok(data
            .photos
            .into_iter()
            .filter_map(|p| {
                let url = p.src.large2x.or(p.src.large).or(p.src.original)?;
                Some(HeroImage {
                    url,
                    alt: p.alt.filter(|a| !a.trim().is_empty()).unwrap_or_else(|| query.to_string()),
                    width: p.width,
                    height: p.height,
                    photographer: p.photographer,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_key_disables_client() {
        assert!(PexelsClient::new("").is_none());
        assert!(PexelsClient::new("your_pexels_key").is_none());
        assert!(PexelsClient::new("abc123").is_some());
    }

    #[test]
    fn test_photo_source_fallback() {
        let json = r#"{"photos":[
            {"width":10,"height":5,"alt":"","photographer":"A","src":{"large":"L","original":"O"}},
            {"width":10,"height":5,"src":{"original":"O2"}}
        ]}"#;
        let data: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(data.photos[0].src.large.as_deref(), Some("L"));
        assert!(data.photos[1].src.large2x.is_none());
    }
}
