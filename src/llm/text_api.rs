//! Plain text-completion endpoint
//!
//! `GET {url}?text=<prompt>` answering `{"result": "<completion>"}`. Chat
//! structure is flattened into the single `text` parameter.

use super::types::{LlmRequest, LlmResponse, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_TEXT_API_URL: &str = "https://api.ryzendesu.vip/api/ai/chatgpt";

pub struct TextApiService {
    client: Client,
    url: String,
}

impl TextApiService {
    pub fn new(url: impl Into<String>) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    fn parse_body(body: &str) -> Result<LlmResponse, LlmError> {
        let parsed: TextApiResponse = serde_json::from_str(body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        let text = parsed
            .result
            .ok_or_else(|| LlmError::unknown(format!("Response has no result: {body}")))?;

        Ok(LlmResponse {
            text,
            usage: Usage::default(),
        })
    }
}

#[async_trait]
impl LlmService for TextApiService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let prompt = request.flattened_text();

        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .query(&[("text", prompt.as_str())])
            .send()
            .await
            .map_err(|e| LlmError::from_transport(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(LlmError::from_status(status, &body));
        }

        Self::parse_body(&body)
    }

    fn model_id(&self) -> &str {
        "text-api"
    }
}

#[derive(Debug, Deserialize)]
struct TextApiResponse {
    #[serde(default)]
    result: Option<String>,
}
