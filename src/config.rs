use std::net::SocketAddr;

use clap::Parser;

use crate::enrich::MergePolicy;

pub const DEFAULT_LISTING_QUOTA: usize = 4;
pub const DEFAULT_TEXT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Listing aggregators searched for photos when `--sites` is not given.
pub const DEFAULT_SITES: &[&str] = &[
    "cars.com",
    "autotrader.com",
    "cargurus.com",
    "carfax.com",
    "edmunds.com",
    "truecar.com",
    "carvana.com",
];

/// Command-line and environment configuration.
///
/// Every flag falls back to an environment variable so the service can be
/// configured from a `.env` file alone.
#[derive(Parser, Debug)]
#[command(name = "carlens", version, about = "Vehicle valuation with real listing photos")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "CARLENS_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Origin allowed by CORS (the frontend dev server)
    #[arg(long, env = "CARLENS_ALLOWED_ORIGIN", default_value = "http://localhost:5173")]
    pub allowed_origin: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Chat completions endpoint base (any OpenAI-compatible server)
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    pub openai_base_url: String,

    /// Model used for free-text valuations
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_TEXT_MODEL)]
    pub openai_model: String,

    /// Model used for photo valuations
    #[arg(long, env = "OPENAI_VISION_MODEL", default_value = DEFAULT_VISION_MODEL)]
    pub openai_vision_model: String,

    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    /// Programmable Search Engine ID (`cx`)
    #[arg(long, env = "GOOGLE_CSE_ID")]
    pub google_cse_id: Option<String>,

    /// Maximum number of photo-backed listings per valuation
    #[arg(long, env = "CARLENS_LISTING_QUOTA", default_value_t = DEFAULT_LISTING_QUOTA)]
    pub listing_quota: usize,

    /// How search results are combined with model-supplied listings
    #[arg(long, env = "CARLENS_MERGE_POLICY", value_enum, default_value_t = MergePolicy::Replace)]
    pub merge_policy: MergePolicy,

    /// Comma-separated listing sites to search (defaults to a built-in list)
    #[arg(long, env = "CARLENS_SITES", value_delimiter = ',')]
    pub sites: Vec<String>,
}

impl Args {
    pub fn search_config(&self) -> SearchConfig {
        let credentials = match (
            ApiKey::parse(self.google_api_key.as_deref()),
            non_blank(self.google_cse_id.as_deref()),
        ) {
            (Some(api_key), Some(engine_id)) => Some(GoogleCredentials { api_key, engine_id }),
            _ => None,
        };
        let sites = if self.sites.is_empty() {
            DEFAULT_SITES.iter().map(|s| s.to_string()).collect()
        } else {
            normalize_sites(&self.sites)
        };
        SearchConfig {
            credentials,
            sites,
            quota: self.listing_quota,
            merge_policy: self.merge_policy,
        }
    }

    pub fn valuation_config(&self) -> ValuationConfig {
        ValuationConfig {
            api_key: ApiKey::parse(self.openai_api_key.as_deref()),
            base_url: self.openai_base_url.trim_end_matches('/').to_string(),
            text_model: self.openai_model.clone(),
            vision_model: self.openai_vision_model.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for absent or blank keys.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        non_blank(raw).map(Self)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    pub api_key: ApiKey,
    pub engine_id: String,
}

/// Immutable search settings shared by every request.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// `None` when either Google variable is unset; searches then yield nothing.
    pub credentials: Option<GoogleCredentials>,
    pub sites: Vec<String>,
    pub quota: usize,
    pub merge_policy: MergePolicy,
}

#[derive(Debug, Clone)]
pub struct ValuationConfig {
    pub api_key: Option<ApiKey>,
    pub base_url: String,
    pub text_model: String,
    pub vision_model: String,
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Lowercases, strips scheme/`www.`/paths, and drops blanks and repeats so a
/// run never visits the same site twice.
fn normalize_sites(raw: &[String]) -> Vec<String> {
    let mut sites: Vec<String> = Vec::new();
    for site in raw {
        let site = site.trim().to_ascii_lowercase();
        let site = site
            .strip_prefix("https://")
            .or_else(|| site.strip_prefix("http://"))
            .unwrap_or(&site);
        let site = site.strip_prefix("www.").unwrap_or(site);
        let site = site.split('/').next().unwrap_or_default();
        if !site.is_empty() && !sites.iter().any(|s| s == site) {
            sites.push(site.to_string());
        }
    }
    sites
}
