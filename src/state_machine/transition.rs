//! Pure state transition function

use super::{ChatContext, ChatState, Effect, Event, PendingGuess};
use crate::game::{board, Credit, Session};
use crate::oracle::{OracleError, OracleRequest, Verdict};
use thiserror::Error;
use uuid::Uuid;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    /// Replies in emission order
    #[allow(dead_code)] // Used in tests
    pub fn replies(&self) -> Vec<&str> {
        self.effects.iter().filter_map(Effect::reply_text).collect()
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A verdict is pending, guess must wait")]
    VerdictPending,
    #[error("Verdict for guess {guess_id} in session {session_id} is no longer expected")]
    StaleVerdict { session_id: Uuid, guess_id: Uuid },
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(
    state: &ChatState,
    context: &ChatContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Start
        // ============================================================

        // Idle + Start -> Playing
        (ChatState::Idle, Event::StartRequested { session_id, question }) => {
            let prompt = board::start_prompt(&question, &context.tokens.resign);
            let session = Session::new(session_id, question);
            Ok(TransitionResult::new(ChatState::Playing {
                session: session.clone(),
            })
            .with_effect(Effect::CreateSession { session })
            .with_effect(Effect::reply(prompt)))
        }

        // Active + Start -> unchanged, existing round untouched
        (ChatState::Playing { .. } | ChatState::Judging { .. }, Event::StartRequested { .. }) => {
            Ok(TransitionResult::new(state.clone())
                .with_effect(Effect::reply(board::already_in_progress())))
        }

        // ============================================================
        // Resign
        // ============================================================

        // No round running: resignations and guesses are ordinary chat
        (ChatState::Idle, Event::ResignRequested | Event::GuessSubmitted { .. }) => {
            Ok(TransitionResult::new(ChatState::Idle))
        }

        // Active + Resign -> Idle, a pending verdict becomes stale
        (
            ChatState::Playing { session } | ChatState::Judging { session, .. },
            Event::ResignRequested,
        ) => Ok(TransitionResult::new(ChatState::Idle)
            .with_effect(Effect::DeleteSession)
            .with_effect(Effect::reply(board::resign_reveal(session)))),

        // ============================================================
        // Guesses
        // ============================================================

        // Playing + Guess -> Judging
        (
            ChatState::Playing { session },
            Event::GuessSubmitted {
                guess_id,
                sender,
                text,
            },
        ) => {
            let normalized = text.trim().to_lowercase();
            if normalized.is_empty() || context.tokens.is_resign(&normalized) {
                return Ok(TransitionResult::new(state.clone()));
            }

            let question = session.question();
            let request = OracleRequest {
                prompt: question.prompt.clone(),
                answers: question
                    .answer_texts()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                guess: text.trim().to_string(),
            };

            Ok(TransitionResult::new(ChatState::Judging {
                session: session.clone(),
                guess: PendingGuess {
                    guess_id,
                    sender,
                    text,
                },
            })
            .with_effect(Effect::RequestVerdict {
                session_id: session.id(),
                guess_id,
                request,
            }))
        }

        // Guesses queue behind the pending verdict
        (ChatState::Judging { .. }, Event::GuessSubmitted { .. }) => {
            Err(TransitionError::VerdictPending)
        }

        // ============================================================
        // Verdicts
        // ============================================================

        (
            ChatState::Judging { session, guess },
            Event::VerdictReceived {
                session_id,
                guess_id,
                outcome,
            },
        ) if session.id() == session_id && guess.guess_id == guess_id => {
            Ok(apply_verdict(session, guess, outcome, context))
        }

        // Session resigned, completed, or replaced since the guess was asked
        (
            _,
            Event::VerdictReceived {
                session_id,
                guess_id,
                ..
            },
        ) => Err(TransitionError::StaleVerdict {
            session_id,
            guess_id,
        }),
    }
}

fn apply_verdict(
    session: &Session,
    guess: &PendingGuess,
    outcome: Result<Verdict, OracleError>,
    context: &ChatContext,
) -> TransitionResult {
    let playing = || ChatState::Playing {
        session: session.clone(),
    };

    let canonical_text = match outcome {
        Err(_) | Ok(Verdict::Malformed { .. }) => {
            return TransitionResult::new(playing())
                .with_effect(Effect::reply(board::check_failed()));
        }
        Ok(Verdict::Rejected { reply }) => {
            return TransitionResult::new(playing()).with_effect(Effect::reply(reply));
        }
        Ok(Verdict::Accepted { canonical_text }) => canonical_text,
    };

    let mut updated = session.clone();
    match updated.credit(&canonical_text, &guess.sender) {
        Credit::Unresolved => {
            tracing::warn!(
                chat_id = %context.chat_id,
                accepted = %canonical_text,
                guess = %guess.text,
                "Oracle accepted an answer that matches no slot"
            );
            TransitionResult::new(playing())
        }
        Credit::AlreadyFound { slot, record } => TransitionResult::new(playing())
            .with_effect(Effect::reply(board::already_answered(&slot, record.points))),
        Credit::Credited {
            completed: false, ..
        } => {
            let reply = board::correct_answer(&updated, &context.tokens.resign);
            TransitionResult::new(ChatState::Playing {
                session: updated.clone(),
            })
            .with_effect(Effect::UpdateSession { session: updated })
            .with_effect(Effect::reply(reply))
        }
        Credit::Credited {
            completed: true, ..
        } => TransitionResult::new(ChatState::Idle).with_effects([
            Effect::DeleteSession,
            Effect::reply(board::correct_answer(&updated, &context.tokens.resign)),
            Effect::reply(board::round_complete(&updated)),
        ]),
    }
}
