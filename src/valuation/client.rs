use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::prompt::{PHOTO_SYSTEM_PROMPT, TEXT_SYSTEM_PROMPT, parse_reply};
use super::types::{ChatMessage, ChatRequest, ChatResponse};
use super::{ValuationError, ValuationModel};
use crate::config::{ApiKey, ValuationConfig};
use crate::vehicle::ValuationRecord;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat-completions client for any OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    api_key: ApiKey,
    text_model: String,
    vision_model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(http: Client, config: &ValuationConfig) -> Result<Self, ValuationError> {
        let api_key = config.api_key.clone().ok_or(ValuationError::ApiKeyNotSet)?;
        Ok(Self {
            http,
            api_key,
            text_model: config.text_model.clone(),
            vision_model: config.vision_model.clone(),
            base_url: config.base_url.clone(),
        })
    }

    async fn complete(&self, model: &str, messages: Vec<ChatMessage>) -> Result<String, ValuationError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: model.to_string(),
            messages,
            temperature: 0.0,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("language model rate limited");
            return Err(ValuationError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ChatResponse>(&text)
                .ok()
                .and_then(|body| body.error)
                .and_then(|err| err.message)
                .unwrap_or_else(|| {
                    let end = text.floor_char_boundary(200);
                    format!("HTTP {status}: {}", &text[..end])
                });
            warn!(status = %status, "language model API error");
            return Err(ValuationError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await?;
        if let Some(err) = body.error {
            return Err(ValuationError::Api {
                code: status.as_u16(),
                message: err.message.unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        debug!(model, "chat completion received");
        body.choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.message.content)
            .ok_or(ValuationError::EmptyReply)
    }
}

impl ValuationModel for OpenAiClient {
    async fn value_by_description(&self, search_term: &str) -> Result<ValuationRecord, ValuationError> {
        let reply = self
            .complete(
                &self.text_model,
                vec![
                    ChatMessage::system(TEXT_SYSTEM_PROMPT),
                    ChatMessage::user(search_term),
                ],
            )
            .await?;
        parse_reply(&reply)
    }

    async fn value_by_photo(&self, data_url: &str) -> Result<ValuationRecord, ValuationError> {
        let reply = self
            .complete(
                &self.vision_model,
                vec![
                    ChatMessage::system(PHOTO_SYSTEM_PROMPT),
                    ChatMessage::user_image(data_url),
                ],
            )
            .await?;
        parse_reply(&reply)
    }
}
