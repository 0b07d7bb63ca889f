//! Backend selection for the oracle's LLM

use super::openai::DEFAULT_MODEL;
use super::text_api::DEFAULT_TEXT_API_URL;
use super::{LlmError, LlmService, LoggingService, OpenAIService, TextApiService};
use std::sync::Arc;

/// Configuration for LLM providers
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub openai_api_key: Option<String>,
    /// Base URL of an OpenAI-compatible API (e.g. a local gateway)
    pub openai_base_url: Option<String>,
    pub model: Option<String>,
    /// Text-completion endpoint used when no OpenAI key is configured
    pub text_api_url: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            openai_base_url: std::env::var("OPENAI_BASE_URL").ok(),
            model: std::env::var("ORACLE_MODEL").ok(),
            text_api_url: std::env::var("API_URL").ok(),
        }
    }

    /// Build the configured backend, wrapped for logging.
    ///
    /// An OpenAI key wins; otherwise the text endpoint is used.
    pub fn build_service(&self) -> Result<Arc<dyn LlmService>, LlmError> {
        let inner: Arc<dyn LlmService> = match &self.openai_api_key {
            Some(key) => Arc::new(OpenAIService::new(
                key.clone(),
                self.model.as_deref().unwrap_or(DEFAULT_MODEL),
                self.openai_base_url.as_deref(),
            )?),
            None => Arc::new(TextApiService::new(
                self.text_api_url.as_deref().unwrap_or(DEFAULT_TEXT_API_URL),
            )?),
        };
        Ok(Arc::new(LoggingService::new(inner)))
    }
}
