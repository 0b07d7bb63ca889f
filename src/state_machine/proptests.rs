//! Property-based tests for the state machine
//!
//! Random command, guess and verdict sequences are driven through
//! `transition` while a model store applies the emitted effects.

use super::transition::*;
use super::*;
use crate::game::{AnswerSlot, Question, Session};
use crate::oracle::{OracleError, Verdict};
use crate::router::CommandTokens;
use proptest::prelude::*;
use uuid::Uuid;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> ChatContext {
    ChatContext::new("prop-chat", CommandTokens::default())
}

fn fixed_question() -> Question {
    Question::new(
        "Sebutkan hewan berkaki empat",
        vec![
            AnswerSlot::new("kucing", 35),
            AnswerSlot::new("anjing", 30),
            AnswerSlot::new("sapi", 20),
            AnswerSlot::new("kuda", 15),
        ],
    )
}

#[derive(Debug, Clone)]
enum Action {
    Start,
    Resign,
    Guess { sender: String, text: String },
    Verdict(VerdictKind),
    StaleVerdict,
}

#[derive(Debug, Clone)]
enum VerdictKind {
    Accept(String),
    Reject(String),
    Malformed,
    Failure,
}

impl VerdictKind {
    fn outcome(self) -> Result<Verdict, OracleError> {
        match self {
            VerdictKind::Accept(canonical_text) => Ok(Verdict::Accepted { canonical_text }),
            VerdictKind::Reject(reply) => Ok(Verdict::Rejected { reply }),
            VerdictKind::Malformed => Ok(Verdict::Malformed { raw: String::new() }),
            VerdictKind::Failure => Err(OracleError::Unavailable("down".to_string())),
        }
    }
}

/// Store that only changes through effects
#[derive(Debug, Default)]
struct ModelStore {
    session: Option<Session>,
}

impl ModelStore {
    fn apply(&mut self, effect: &Effect) -> Result<(), TestCaseError> {
        match effect {
            Effect::CreateSession { session } => {
                prop_assert!(self.session.is_none(), "create over an active session");
                self.session = Some(session.clone());
            }
            Effect::UpdateSession { session } => {
                let stored = self.session.as_ref();
                prop_assert_eq!(stored.map(Session::id), Some(session.id()));
                self.session = Some(session.clone());
            }
            Effect::DeleteSession => {
                prop_assert!(self.session.is_some(), "delete without a session");
                self.session = None;
            }
            Effect::RequestVerdict { .. } | Effect::Reply { .. } => {}
        }
        Ok(())
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_answer_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("kucing".to_string()),
        Just("Anjing".to_string()),
        Just("SAPI".to_string()),
        Just("kuda".to_string()),
        Just("kud".to_string()),
        Just("gajah".to_string()),
    ]
}

fn arb_verdict_kind() -> impl Strategy<Value = VerdictKind> {
    prop_oneof![
        4 => arb_answer_text().prop_map(VerdictKind::Accept),
        1 => "[a-z ]{1,20}".prop_map(VerdictKind::Reject),
        1 => Just(VerdictKind::Malformed),
        1 => Just(VerdictKind::Failure),
    ]
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        2 => Just(Action::Start),
        1 => Just(Action::Resign),
        4 => (prop_oneof![Just("Budi"), Just("Siti"), Just("Agus")], "[a-z ]{0,12}")
            .prop_map(|(sender, text)| Action::Guess {
                sender: sender.to_string(),
                text,
            }),
        5 => arb_verdict_kind().prop_map(Action::Verdict),
        1 => Just(Action::StaleVerdict),
    ]
}

fn event_for(action: Action, state: &ChatState) -> Event {
    match action {
        Action::Start => Event::StartRequested {
            session_id: Uuid::new_v4(),
            question: fixed_question(),
        },
        Action::Resign => Event::ResignRequested,
        Action::Guess { sender, text } => Event::GuessSubmitted {
            guess_id: Uuid::new_v4(),
            sender,
            text,
        },
        Action::Verdict(kind) => match state {
            ChatState::Judging { session, guess } => Event::VerdictReceived {
                session_id: session.id(),
                guess_id: guess.guess_id,
                outcome: kind.outcome(),
            },
            _ => Event::VerdictReceived {
                session_id: Uuid::new_v4(),
                guess_id: Uuid::new_v4(),
                outcome: kind.outcome(),
            },
        },
        Action::StaleVerdict => Event::VerdictReceived {
            session_id: state.session().map_or_else(Uuid::new_v4, Session::id),
            guess_id: Uuid::new_v4(),
            outcome: Ok(Verdict::Accepted {
                canonical_text: "kucing".to_string(),
            }),
        },
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// The store always mirrors the session held by the state, and the
    /// score always equals the points of the found slots.
    #[test]
    fn store_tracks_state_through_any_sequence(
        actions in proptest::collection::vec(arb_action(), 1..60)
    ) {
        let context = test_context();
        let mut state = ChatState::Idle;
        let mut store = ModelStore::default();

        for action in actions {
            let event = event_for(action, &state);
            match transition(&state, &context, event) {
                Ok(result) => {
                    for effect in &result.effects {
                        store.apply(effect)?;
                    }
                    state = result.new_state;
                }
                Err(TransitionError::VerdictPending) => {
                    prop_assert!(state.is_judging());
                }
                Err(TransitionError::StaleVerdict { .. }) => {}
            }

            prop_assert_eq!(store.session.as_ref(), state.session());
            if let Some(session) = state.session() {
                prop_assert_eq!(session.score(), session.found_points());
                prop_assert!(!session.is_complete(), "complete session left active");
            }
        }
    }

    /// Starting while a round is running never touches it.
    #[test]
    fn start_never_replaces_active_round(
        actions in proptest::collection::vec(arb_action(), 1..30)
    ) {
        let context = test_context();
        let mut state = ChatState::Idle;

        for action in actions {
            let event = event_for(action, &state);
            if let Ok(result) = transition(&state, &context, event) {
                state = result.new_state;
            }
        }

        if state.session().is_some() {
            let result = transition(
                &state,
                &context,
                Event::StartRequested {
                    session_id: Uuid::new_v4(),
                    question: fixed_question(),
                },
            )
            .unwrap();
            prop_assert_eq!(&result.new_state, &state);
            prop_assert_eq!(result.replies(), vec!["Game Family 100 sedang berlangsung!"]);
        }
    }

    /// Verdicts that do not match the pending guess never change state.
    #[test]
    fn mismatched_verdict_is_stale(kind in arb_verdict_kind(), text in "[a-z]{1,10}") {
        let context = test_context();
        let playing = transition(
            &ChatState::Idle,
            &context,
            Event::StartRequested {
                session_id: Uuid::new_v4(),
                question: fixed_question(),
            },
        )
        .unwrap()
        .new_state;
        let judging = transition(
            &playing,
            &context,
            Event::GuessSubmitted {
                guess_id: Uuid::new_v4(),
                sender: "Budi".to_string(),
                text,
            },
        )
        .unwrap()
        .new_state;

        let result = transition(
            &judging,
            &context,
            Event::VerdictReceived {
                session_id: judging.session().unwrap().id(),
                guess_id: Uuid::new_v4(),
                outcome: kind.outcome(),
            },
        );
        let is_stale = matches!(result, Err(TransitionError::StaleVerdict { .. }));
        prop_assert!(is_stale);
    }
}
