use serde::Deserialize;

/// Custom Search JSON API response (only the fields we read).
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub items: Option<Vec<SearchItem>>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub title: Option<String>,
    /// Direct image URL for `searchType=image`.
    pub link: Option<String>,
    pub image: Option<ImageMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMeta {
    /// The page the image was found on.
    pub context_link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: Option<u16>,
    pub message: Option<String>,
}

/// A photo-backed listing candidate from one site search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub image_url: String,
    pub source_url: String,
    pub title: Option<String>,
}
