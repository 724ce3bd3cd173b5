//! Site-scoped image search: one request against one listing site.

pub mod client;
pub mod types;

pub use client::GoogleImageSearch;
pub use types::Candidate;

#[derive(Debug, thiserror::Error)]
pub enum ImageSearchError {
    #[error("GOOGLE_API_KEY or GOOGLE_CSE_ID not set")]
    CredentialsNotSet,

    #[error("image search rate limit exceeded")]
    RateLimited,

    #[error("image search API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Searches one site for photos of a subject.
/// Implemented by `GoogleImageSearch` for production; mock implementations used in tests.
pub trait SiteSearcher {
    /// Returns at most `count` candidates found on `site`.
    async fn search_site(
        &self,
        subject: &str,
        site: &str,
        count: usize,
    ) -> Result<Vec<Candidate>, ImageSearchError>;
}
