//! Language-model valuation: turns a description or a photo into a `ValuationRecord`.

pub mod client;
mod prompt;
pub mod types;

pub use client::OpenAiClient;

use crate::vehicle::ValuationRecord;

#[derive(Debug, thiserror::Error)]
pub enum ValuationError {
    #[error("OPENAI_API_KEY not set")]
    ApiKeyNotSet,

    #[error("language model rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("language model API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("language model returned an empty reply")]
    EmptyReply,

    #[error("could not parse valuation record: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Produces valuation records.
/// Implemented by `OpenAiClient` for production; mock implementations used in tests.
pub trait ValuationModel {
    async fn value_by_description(&self, search_term: &str) -> Result<ValuationRecord, ValuationError>;

    /// `data_url` is a `data:<mime>;base64,...` image URL.
    async fn value_by_photo(&self, data_url: &str) -> Result<ValuationRecord, ValuationError>;
}
