//! Chat state types

use crate::game::Session;
use crate::router::CommandTokens;
use uuid::Uuid;

/// A guess whose verdict is still outstanding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGuess {
    pub guess_id: Uuid,
    pub sender: String,
    pub text: String,
}

/// State of one chat
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChatState {
    /// No round running
    #[default]
    Idle,
    /// Round running, waiting for guesses
    Playing { session: Session },
    /// Round running, one guess is with the oracle
    Judging {
        session: Session,
        guess: PendingGuess,
    },
}

impl ChatState {
    /// Resume from whatever the store holds for the chat
    pub fn from_stored(session: Option<Session>) -> Self {
        match session {
            Some(session) => ChatState::Playing { session },
            None => ChatState::Idle,
        }
    }

    #[allow(dead_code)] // Used in tests
    pub fn session(&self) -> Option<&Session> {
        match self {
            ChatState::Idle => None,
            ChatState::Playing { session } | ChatState::Judging { session, .. } => Some(session),
        }
    }

    pub fn is_judging(&self) -> bool {
        matches!(self, ChatState::Judging { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChatState::Idle => "idle",
            ChatState::Playing { .. } => "playing",
            ChatState::Judging { .. } => "judging",
        }
    }
}

/// Fixed facts about the chat a state machine runs for
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub chat_id: String,
    pub tokens: CommandTokens,
}

impl ChatContext {
    pub fn new(chat_id: impl Into<String>, tokens: CommandTokens) -> Self {
        Self {
            chat_id: chat_id.into(),
            tokens,
        }
    }
}
