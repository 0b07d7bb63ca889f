//! Answer oracle: semantic judgment of free-text guesses
//!
//! The oracle is asked whether a guess means the same as one of the
//! canonical answers. Its reply is raw text; `verdict::parse_verdict` turns it
//! into the tagged `Verdict` the state machine works with.

mod prompt;
mod verdict;

pub use prompt::build_prompt;
pub use verdict::{parse_verdict, Verdict};

use crate::llm::{LlmMessage, LlmRequest, LlmService};
use crate::runtime::AnswerOracle;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

/// One guess to be judged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRequest {
    pub prompt: String,
    /// Canonical answer texts in slot order
    pub answers: Vec<String>,
    pub guess: String,
}

impl OracleRequest {
    /// Answers joined for transport
    pub fn canonical_list(&self) -> String {
        self.answers.join(", ")
    }
}

/// Failure to obtain any reply from the oracle
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
    #[error("oracle timed out after {0:?}")]
    Timeout(Duration),
}

pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(20);

/// Oracle backed by an LLM completion service
pub struct LlmOracle {
    service: Arc<dyn LlmService>,
    timeout: Duration,
}

impl LlmOracle {
    pub fn new(service: Arc<dyn LlmService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }
}

#[async_trait]
impl AnswerOracle for LlmOracle {
    async fn ask(&self, request: &OracleRequest) -> Result<String, OracleError> {
        let llm_request = LlmRequest {
            system: None,
            messages: vec![LlmMessage::user(build_prompt(request))],
            max_tokens: Some(256),
        };

        match timeout(self.timeout, self.service.complete(&llm_request)).await {
            Ok(Ok(response)) => Ok(response.text),
            Ok(Err(e)) => Err(OracleError::Unavailable(e.message)),
            Err(_) => Err(OracleError::Timeout(self.timeout)),
        }
    }
}
