//! infobytes-web library - blog JSON API
//!
//! Public read endpoints, a password-gated admin API and service health,
//! served over whichever [`BlogStore`] backend is configured.

use axum::Router;
use chrono::{DateTime, Utc};
use infobytes_common::store::BlogStore;
use infobytes_gen::PostGenerator;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use error::{ApiError, ApiResult};

/// Prefix of every blog endpoint
pub const API_PREFIX: &str = "/api/blog";

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Local or remote content backend
    pub store: Arc<dyn BlogStore>,
    /// Post generator; only present with the local backend and a model key
    pub generator: Option<Arc<PostGenerator>>,
    /// SHA-256 of the admin password; `None` disables the admin API
    admin_password_digest: Option<[u8; 32]>,
    /// Pause between posts of an admin batch
    pub batch_delay: Duration,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: Arc<dyn BlogStore>, admin_password: Option<&str>) -> Self {
        Self {
            store,
            generator: None,
            admin_password_digest: admin_password
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(digest),
            batch_delay: Duration::from_secs(infobytes_common::config::DEFAULT_BATCH_DELAY_SECS),
            startup_time: Utc::now(),
        }
    }

    pub fn with_generator(mut self, generator: Arc<PostGenerator>, batch_delay: Duration) -> Self {
        self.generator = Some(generator);
        self.batch_delay = batch_delay;
        self
    }

    pub fn admin_enabled(&self) -> bool {
        self.admin_password_digest.is_some()
    }

    /// Compare a supplied password against the configured one
    pub fn check_admin_password(&self, supplied: &str) -> bool {
        match &self.admin_password_digest {
            Some(expected) => {
                let supplied = digest(supplied);
                // Constant-time over the digest bytes
                expected
                    .iter()
                    .zip(supplied.iter())
                    .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                    == 0
            }
            None => false,
        }
    }
}

fn digest(password: &str) -> [u8; 32] {
    Sha256::digest(password.as_bytes()).into()
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;

    let admin = api::admin_routes().layer(middleware::from_fn_with_state(
        state.clone(),
        api::auth_middleware,
    ));

    let blog = Router::new()
        .merge(api::post_routes())
        .merge(api::niche_routes())
        .merge(api::login_routes())
        .merge(admin);

    Router::new()
        .nest(API_PREFIX, blog)
        .merge(api::health_routes())
        .merge(api::buildinfo_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
