use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use tracing::info;

use super::AppState;
use super::errors::ServerError;
use crate::enrich;
use crate::vehicle::ValuationRecord;

const UPLOAD_FIELD: &str = "image";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindCarsRequest {
    /// Free-text vehicle description, e.g. "Honda Civic 2024"
    pub search_term: String,
}

pub async fn find_cars(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FindCarsRequest>, JsonRejection>,
) -> Result<Json<ValuationRecord>, ServerError> {
    let Json(req) = payload?;
    let term = req.search_term.trim();
    if term.is_empty() {
        return Err(ServerError::BadRequest("searchTerm must not be empty".into()));
    }

    info!(search_term = %term, "find-cars");

    let model = state.valuation()?;
    let record = enrich::find_cars(model, &state.search, &state.config, term).await?;

    info!(listings = record.listings.len(), "find-cars complete");
    Ok(Json(record))
}

/// Values the vehicle in an uploaded photo (multipart field `image`).
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ValuationRecord>, ServerError> {
    let mut image = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            image = Some((content_type, field.bytes().await?));
            break;
        }
    }

    let (content_type, bytes) = image
        .ok_or_else(|| ServerError::BadRequest(format!("missing `{UPLOAD_FIELD}` file field")))?;
    if bytes.is_empty() {
        return Err(ServerError::BadRequest("uploaded image is empty".into()));
    }

    info!(content_type = %content_type, bytes = bytes.len(), "upload");

    let data_url = format!("data:{content_type};base64,{}", BASE64.encode(&bytes));
    let model = state.valuation()?;
    let record = enrich::appraise_photo(model, &state.search, &state.config, &data_url).await?;

    info!(listings = record.listings.len(), "upload complete");
    Ok(Json(record))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
