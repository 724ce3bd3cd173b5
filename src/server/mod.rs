//! HTTP surface: `/find-cars`, `/upload` and `/health`.

mod errors;
mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use reqwest::Client;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::{Args, SearchConfig};
use crate::image_search::GoogleImageSearch;
use crate::valuation::{OpenAiClient, ValuationError};
use errors::ServerError;

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Global HTTP client timeout covering DNS + connect + response body.
const HTTP_TIMEOUT: Duration = Duration::from_secs(90);
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Shared, read-only request state.
///
/// Configuration via environment variables (see `Args`):
/// - `OPENAI_API_KEY`: enables valuations; without it every valuation is a 500
/// - `GOOGLE_API_KEY` + `GOOGLE_CSE_ID`: enables listing photos; without them listings come back empty
pub struct AppState {
    pub search: GoogleImageSearch,
    pub valuation: Option<OpenAiClient>,
    pub config: SearchConfig,
}

impl AppState {
    pub fn from_args(http: Client, args: &Args) -> Self {
        let config = args.search_config();
        let search = GoogleImageSearch::new(http.clone(), &config);
        let valuation = OpenAiClient::new(http, &args.valuation_config())
            .inspect_err(|e| warn!("valuation model not available: {e}"))
            .ok();
        Self {
            search,
            valuation,
            config,
        }
    }

    fn valuation(&self) -> Result<&OpenAiClient, ServerError> {
        self.valuation
            .as_ref()
            .ok_or(ServerError::Valuation(ValuationError::ApiKeyNotSet))
    }
}

pub fn http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .build()
}

pub fn router(state: Arc<AppState>, allowed_origin: HeaderValue) -> Router {
    Router::new()
        .route("/find-cars", post(handlers::find_cars))
        .route("/upload", post(handlers::upload))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(allowed_origin)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
