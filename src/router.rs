//! Message router boundary
//!
//! Classifies inbound chat text into game commands or candidate guesses and
//! defines the inbound/outbound message shapes exchanged with the transport.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Leading command punctuation plus any whitespace after it, e.g. `. f100`
static COMMAND_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[./!#]\s*").expect("command prefix pattern is valid"));

/// A chat message delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InboundMessage {
    pub chat_id: String,
    pub sender_name: String,
    pub body: String,
}

/// A reply to deliver to a chat, in emission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundReply {
    pub chat_id: String,
    pub text: String,
}

/// What an inbound body means to the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Start,
    Resign,
    /// Anything else that is not blank; a guess if a round is running
    Text(String),
    Empty,
}

/// Start and resign command words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTokens {
    pub start: String,
    pub resign: String,
}

impl Default for CommandTokens {
    fn default() -> Self {
        Self::new("f100", "nyerah")
    }
}

impl CommandTokens {
    pub fn new(start: &str, resign: &str) -> Self {
        Self {
            start: normalize_command(start),
            resign: normalize_command(resign),
        }
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let start = std::env::var("FAMILY100_START_TOKEN").unwrap_or(defaults.start);
        let resign = std::env::var("FAMILY100_RESIGN_TOKEN").unwrap_or(defaults.resign);
        Self::new(&start, &resign)
    }

    pub fn classify(&self, body: &str) -> Inbound {
        let command = normalize_command(body);
        if command.is_empty() {
            Inbound::Empty
        } else if command == self.start {
            Inbound::Start
        } else if command == self.resign {
            Inbound::Resign
        } else {
            Inbound::Text(body.trim().to_string())
        }
    }

    /// Whether an already-normalized guess is the resign word
    pub fn is_resign(&self, normalized_guess: &str) -> bool {
        normalize_command(normalized_guess) == self.resign
    }
}

/// Case-fold, trim, and drop a leading command punctuation mark
pub fn normalize_command(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    COMMAND_PREFIX.replace(&lowered, "").trim().to_string()
}
