//! Error types for post generation

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GenerationError>;

#[derive(Debug, Error)]
pub enum GenerationError {
    /// Missing or invalid configuration (API keys, cron expression)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failure talking to an external API
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// External API answered with an error status
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Model reply had no text
    #[error("Empty response from model")]
    EmptyResponse,

    /// Model reply was not the JSON we asked for
    #[error("Could not parse model reply: {0}")]
    Parse(String),

    /// Requested niche is unknown or inactive
    #[error("Niche \"{0}\" not found")]
    NotFound(String),

    /// Caller supplied something unusable (blank prompt)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No active niches. Run: infobytes-gen seed")]
    NoNiches,

    #[error(transparent)]
    Store(#[from] infobytes_common::Error),
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::Parse(err.to_string())
    }
}
