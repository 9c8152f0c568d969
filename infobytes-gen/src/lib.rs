//! # Info Bytes generator
//!
//! Post generation for the blog: topic and article synthesis through a
//! generative text model, hero image sourcing, weighted niche rotation,
//! batch runs and a cron-driven scheduler.

pub mod ai;
pub mod batch;
pub mod config;
pub mod error;
pub mod images;
pub mod maintenance;
pub mod niche_select;
pub mod pipeline;
pub mod prompts;
pub mod scheduler;
pub mod seed;

pub use error::{GenerationError, Result};
pub use pipeline::{GeneratedPost, PostGenerator, PromptDraft};
