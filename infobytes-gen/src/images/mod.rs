//! Hero image selection
//!
//! Order of preference:
//! 1. Model-refined query searched on Pexels (first result)
//! 2. Plain query searched on Pexels
//! 3. Curated Unsplash photo for the query's category
//!
//! [`ImagePicker::hero_image`] always returns an image.

mod pexels;
mod unsplash;

pub use pexels::{PexelsClient, DEFAULT_PEXELS_BASE_URL};
pub use unsplash::{niche_key, unsplash_image, unsplash_url};

use crate::ai::TextGenerator;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default hero dimensions
pub const HERO_WIDTH: u32 = 1200;
pub const HERO_HEIGHT: u32 = 630;

/// Results requested when refining with the model
const REFINED_RESULTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroImage {
    pub url: String,
    pub alt: String,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photographer: Option<String>,
}

/// Stock photo search
#[async_trait]
pub trait ImageSearch: Send + Sync {
    /// Landscape photos for `query`, best match first
    async fn search(&self, query: &str, per_page: u32) -> Result<Vec<HeroImage>>;
}

/// Picks hero images with whatever providers are configured
#[derive(Clone, Default)]
pub struct ImagePicker {
    text: Option<Arc<dyn TextGenerator>>,
    search: Option<Arc<dyn ImageSearch>>,
}

impl ImagePicker {
    pub fn new(text: Option<Arc<dyn TextGenerator>>, search: Option<Arc<dyn ImageSearch>>) -> Self {
        Self { text, search }
    }

    /// Hero image for `query`; falls back to a curated photo on any failure
    pub async fn hero_image(&self, query: &str) -> HeroImage {
        if let Some(image) = self.refined_image(query).await {
            return image;
        }

        if let Some(search) = &self.search {
            match search.search(query, REFINED_RESULTS).await {
                Ok(images) => {
                    if let Some(image) = images.into_iter().next() {
                        return image;
                    }
                }
                Err(e) => warn!("[Images] Pexels error, using Unsplash: {}", e),
            }
        }

        unsplash_image(query, &mut rand::thread_rng())
    }

    /// Several candidate images for `query`
    pub async fn search_images(&self, query: &str, per_page: u32) -> Vec<HeroImage> {
        if let Some(search) = &self.search {
            match search.search(query, per_page).await {
                Ok(images) if !images.is_empty() => return images,
                Ok(_) => {}
                Err(e) => warn!("[Images] Pexels error, using Unsplash: {}", e),
            }
        }

        let mut rng = rand::thread_rng();
        (0..per_page.min(3))
            .map(|i| unsplash_image(&format!("{}{}", query, i), &mut rng))
            .map(|mut image| {
                image.alt = query.to_string();
                image
            })
            .collect()
    }

    /// Ask the model for a tighter query, then search with it
    async fn refined_image(&self, query: &str) -> Option<HeroImage> {
        let (text, search) = match (&self.text, &self.search) {
            (Some(text), Some(search)) => (text, search),
            _ => return None,
        };

        let refined = match text.generate(&crate::prompts::image_query_prompt(query)).await {
            Ok(reply) => reply.trim().replace(['"', '\''], ""),
            Err(e) => {
                warn!("[Images] AI image query failed: {}", e);
                return None;
            }
        };
        if refined.is_empty() {
            return None;
        }
        debug!("[Images] Refined '{}' to '{}'", query, refined);

        match search.search(&refined, REFINED_RESULTS).await {
            Ok(images) => images.into_iter().next().map(|image| HeroImage {
                alt: refined,
                ..image
            }),
            Err(e) => {
                debug!("[Images] Refined search failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GenerationError;
    use std::sync::Mutex;

    struct FixedText(&'static str);

    #[async_trait]
    impl TextGenerator for FixedText {
        fn model(&self) -> &str {
            "fixed"
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Default)]
    struct RecordingSearch {
        queries: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl ImageSearch for RecordingSearch {
        async fn search(&self, query: &str, _per_page: u32) -> Result<Vec<HeroImage>> {
            self.queries.lock().unwrap().push(query.to_string());
            if self.fail {
                return Err(GenerationError::Api {
                    status: 500,
                    body: "down".into(),
                });
            }
            Ok(vec![HeroImage {
                url: format!("https://img.test/{}", query.replace(' ', "-")),
                alt: "from provider".into(),
                width: 1880,
                height: 1253,
                photographer: Some("Jo".into()),
            }])
        }
    }

    #[tokio::test]
    async fn test_refined_query_is_used_as_alt() {
        let search = Arc::new(RecordingSearch::default());
        let picker = ImagePicker::new(Some(Arc::new(FixedText("\"city skyline\""))), Some(search.clone()));

        let image = picker.hero_image("Best SIP plans").await;
        assert_eq!(image.url, "https://img.test/city-skyline");
        assert_eq!(image.alt, "city skyline");
        assert_eq!(search.queries.lock().unwrap().as_slice(), ["city skyline"]);
    }

    #[tokio::test]
    async fn test_without_model_plain_query_is_searched() {
        let search = Arc::new(RecordingSearch::default());
        let picker = ImagePicker::new(None, Some(search.clone()));

        let image = picker.hero_image("bitcoin rally").await;
        assert_eq!(image.url, "https://img.test/bitcoin-rally");
        assert_eq!(image.alt, "from provider");
    }

    #[tokio::test]
    async fn test_failing_provider_falls_back_to_unsplash() {
        let search = Arc::new(RecordingSearch {
            fail: true,
            ..Default::default()
        });
        let picker = ImagePicker::new(Some(Arc::new(FixedText("market"))), Some(search));

        let image = picker.hero_image("bitcoin rally").await;
        assert!(image.url.starts_with("https://images.unsplash.com/photo-"));
        assert_eq!(image.alt, "bitcoin rally");
        assert_eq!((image.width, image.height), (HERO_WIDTH, HERO_HEIGHT));
    }

    #[tokio::test]
    async fn test_search_images_fallback_count() {
        let picker = ImagePicker::default();
        let images = picker.search_images("oscar night", 5).await;
        assert_eq!(images.len(), 3);
        assert!(images.iter().all(|i| i.alt == "oscar night"));
    }
}
