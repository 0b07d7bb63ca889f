//! Events that can occur in a chat

use crate::game::Question;
use crate::oracle::{OracleError, Verdict};
use uuid::Uuid;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Chat commands
    /// Start command. The question is sampled before the event is queued.
    StartRequested {
        session_id: Uuid,
        question: Question,
    },
    ResignRequested,

    // Guesses
    GuessSubmitted {
        guess_id: Uuid,
        sender: String,
        text: String,
    },

    // Oracle
    /// Parsed oracle reply for a guess, tagged with the session it was asked for
    VerdictReceived {
        session_id: Uuid,
        guess_id: Uuid,
        outcome: Result<Verdict, OracleError>,
    },
}

impl Event {
    pub fn is_verdict(&self) -> bool {
        matches!(self, Event::VerdictReceived { .. })
    }
}
