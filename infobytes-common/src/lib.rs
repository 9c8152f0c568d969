//! # Info Bytes Common Library
//!
//! Shared code for the Info Bytes services:
//! - Database initialization and schema synchronization
//! - Domain models (posts, niches, generation log, stats)
//! - The `BlogStore` abstraction with local (SQLite) and remote (HTTP) backends
//! - Configuration loading and root folder resolution
//! - Slug and reading-time helpers

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pagination;
pub mod store;
pub mod text;

pub use error::{Error, Result};
pub use models::{Market, PostStatus};
