use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{ApiError, Candidate, SearchItem, SearchResponse};
use super::{ImageSearchError, SiteSearcher};
use crate::config::{GoogleCredentials, SearchConfig};

const API_BASE: &str = "https://www.googleapis.com/customsearch/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// The API rejects `num` outside 1..=10.
const MAX_RESULTS_PER_REQUEST: usize = 10;

/// Google Programmable Search client restricted to image results.
#[derive(Clone)]
pub struct GoogleImageSearch {
    http: Client,
    credentials: Option<GoogleCredentials>,
    base_url: String,
}

impl GoogleImageSearch {
    pub fn new(http: Client, config: &SearchConfig) -> Self {
        if config.credentials.is_none() {
            warn!("image search credentials missing; listings will have no photos");
        }
        Self {
            http,
            credentials: config.credentials.clone(),
            base_url: API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(
        http: Client,
        credentials: Option<GoogleCredentials>,
        base_url: &str,
    ) -> Self {
        Self {
            http,
            credentials,
            base_url: base_url.to_string(),
        }
    }

    async fn query(
        &self,
        credentials: &GoogleCredentials,
        subject: &str,
        site: &str,
        num: usize,
    ) -> Result<SearchResponse, ImageSearchError> {
        let num = num.to_string();
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("key", credentials.api_key.expose()),
                ("cx", credentials.engine_id.as_str()),
                ("q", subject),
                ("exactTerms", subject),
                ("searchType", "image"),
                ("num", num.as_str()),
                ("imgSize", "large"),
                ("safe", "active"),
                ("siteSearch", site),
                ("siteSearchFilter", "i"),
            ])
            .header("User-Agent", crate::USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ImageSearchError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if let Ok(body) = serde_json::from_str::<SearchResponse>(&text)
                && let Some(err) = &body.error
            {
                return Err(classify_api_error(err, status.as_u16()));
            }
            let end = text.floor_char_boundary(200);
            return Err(ImageSearchError::Api {
                code: status.as_u16(),
                message: format!("HTTP {status}: {}", &text[..end]),
            });
        }

        let body: SearchResponse = response.json().await?;
        if let Some(err) = &body.error {
            return Err(classify_api_error(err, status.as_u16()));
        }
        Ok(body)
    }
}

impl SiteSearcher for GoogleImageSearch {
    async fn search_site(
        &self,
        subject: &str,
        site: &str,
        count: usize,
    ) -> Result<Vec<Candidate>, ImageSearchError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(ImageSearchError::CredentialsNotSet)?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let num = count.min(MAX_RESULTS_PER_REQUEST);
        let response = self.query(credentials, subject, site, num).await?;
        let candidates = extract_candidates(response.items.unwrap_or_default(), count);
        debug!(site, found = candidates.len(), "image search complete");
        Ok(candidates)
    }
}

/// Keeps items whose image and page links are both http(s) URLs, up to `limit`.
fn extract_candidates(items: Vec<SearchItem>, limit: usize) -> Vec<Candidate> {
    items
        .into_iter()
        .filter_map(|item| {
            let image_url = item.link.filter(|u| is_web_url(u))?;
            let source_url = item
                .image
                .and_then(|meta| meta.context_link)
                .filter(|u| is_web_url(u))?;
            let title = item
                .title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());
            Some(Candidate {
                image_url,
                source_url,
                title,
            })
        })
        .take(limit)
        .collect()
}

fn is_web_url(raw: &str) -> bool {
    url::Url::parse(raw).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

fn classify_api_error(err: &ApiError, status: u16) -> ImageSearchError {
    let message = err
        .message
        .clone()
        .unwrap_or_else(|| "Unknown error".to_string());

    match err.code.unwrap_or(status) {
        429 => ImageSearchError::RateLimited,
        code => ImageSearchError::Api { code, message },
    }
}
