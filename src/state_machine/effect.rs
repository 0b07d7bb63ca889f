//! Effects produced by state transitions

use crate::game::Session;
use crate::oracle::OracleRequest;
use uuid::Uuid;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Register a newly started session in the store
    CreateSession { session: Session },

    /// Write back a session after a slot was credited
    UpdateSession { session: Session },

    /// Remove the chat's session (resignation or completion)
    DeleteSession,

    /// Ask the oracle about a guess (runs as background task)
    RequestVerdict {
        session_id: Uuid,
        guess_id: Uuid,
        request: OracleRequest,
    },

    /// Send a message to the chat
    Reply { text: String },
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply { text: text.into() }
    }

    #[allow(dead_code)] // Used in tests
    pub fn reply_text(&self) -> Option<&str> {
        match self {
            Effect::Reply { text } => Some(text),
            _ => None,
        }
    }
}
