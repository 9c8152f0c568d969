//! Generative text model access
//!
//! The pipeline only needs "prompt in, text out"; [`TextGenerator`] is that
//! seam. [`GeminiClient`] is the production implementation.

mod gemini;

pub use gemini::{GeminiClient, DEFAULT_GEMINI_BASE_URL};

use crate::{GenerationError, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier, for logs
    fn model(&self) -> &str;

    /// Complete a prompt; the returned text is never empty
    async fn generate(&self, prompt: &str) -> Result<String>;
}

static OPENING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)```(?:json)?\s*").expect("valid fence pattern"));

/// Remove markdown code fences a model wraps around JSON
pub fn strip_code_fences(text: &str) -> String {
    OPENING_FENCE.replace_all(text, "").replace("```", "").trim().to_string()
}

/// Parse a JSON object out of a model reply
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(&cleaned).map_err(|e| {
        let preview: String = cleaned.chars().take(120).collect();
        GenerationError::Parse(format!("{} (reply starts: {:?})", e, preview))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Reply {
        title: String,
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```JSON {\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("  plain  "), "plain");
        // Only a whole "json" tag is dropped
        assert_eq!(strip_code_fences("```jso\n{}\n```"), "jso\n{}");
    }

    #[test]
    fn test_parse_json_reply() {
        let reply: Reply = parse_json_reply("```json\n{\"title\": \"Hi\"}\n```").unwrap();
        assert_eq!(reply.title, "Hi");

        let err = parse_json_reply::<Reply>("Sure! Here is your topic").unwrap_err();
        assert!(matches!(err, GenerationError::Parse(_)));
    }
}
