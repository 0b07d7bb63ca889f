//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the chat runtime with mock implementations.

use crate::game::{Question, QuestionBank, Session};
use crate::oracle::{OracleError, OracleRequest};
use crate::store::StoreError;
use async_trait::async_trait;
use std::sync::Arc;

/// Storage for the active session of each chat
pub trait SessionStore: Send + Sync {
    /// Active session for the chat, if any
    fn get(&self, chat_id: &str) -> Option<Session>;

    /// Register a new session; fails if the chat already has one
    fn create(&self, chat_id: &str, session: Session) -> Result<(), StoreError>;

    /// Replace the chat's session with a newer version of the same session
    fn update(&self, chat_id: &str, session: Session) -> Result<(), StoreError>;

    /// Remove and return the chat's session
    fn delete(&self, chat_id: &str) -> Option<Session>;
}

/// Judges whether a guess matches one of a question's answers
#[async_trait]
pub trait AnswerOracle: Send + Sync {
    /// Raw oracle reply text, to be read with `parse_verdict`
    async fn ask(&self, request: &OracleRequest) -> Result<String, OracleError>;
}

/// Source of questions for new rounds
pub trait QuestionProvider: Send + Sync {
    fn sample(&self) -> Question;
}

impl QuestionProvider for QuestionBank {
    fn sample(&self) -> Question {
        self.sample_with(&mut rand::thread_rng())
    }
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn get(&self, chat_id: &str) -> Option<Session> {
        (**self).get(chat_id)
    }

    fn create(&self, chat_id: &str, session: Session) -> Result<(), StoreError> {
        (**self).create(chat_id, session)
    }

    fn update(&self, chat_id: &str, session: Session) -> Result<(), StoreError> {
        (**self).update(chat_id, session)
    }

    fn delete(&self, chat_id: &str) -> Option<Session> {
        (**self).delete(chat_id)
    }
}

#[async_trait]
impl<T: AnswerOracle + ?Sized> AnswerOracle for Arc<T> {
    async fn ask(&self, request: &OracleRequest) -> Result<String, OracleError> {
        (**self).ask(request).await
    }
}

impl<T: QuestionProvider + ?Sized> QuestionProvider for Arc<T> {
    fn sample(&self) -> Question {
        (**self).sample()
    }
}
