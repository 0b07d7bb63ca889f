//! API request and response types

use serde::{Deserialize, Serialize};

/// A chat message as delivered by the transport
#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub sender_name: String,
    pub body: String,
}

/// Whether the message reached a chat runtime
#[derive(Debug, Serialize, Deserialize)]
pub struct PostMessageResponse {
    pub forwarded: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
