//! HTTP API handlers for infobytes-web

pub mod admin;
pub mod auth;
pub mod buildinfo;
pub mod health;
pub mod niches;
pub mod posts;

pub use admin::admin_routes;
pub use auth::{auth_middleware, login_routes};
pub use buildinfo::buildinfo_routes;
pub use health::health_routes;
pub use niches::niche_routes;
pub use posts::post_routes;
