//! In-memory session store
//!
//! Holds at most one active session per chat. Writers are serialized per chat
//! by the chat runtime; the mutex only guards the shared key space.

use crate::game::Session;
use crate::runtime::SessionStore;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("chat {chat_id} already has an active session")]
    AlreadyActive { chat_id: String },
    #[error("chat {chat_id} has no active session")]
    NoSession { chat_id: String },
    #[error("chat {chat_id} is running session {active}, not {attempted}")]
    SessionMismatch {
        chat_id: String,
        active: Uuid,
        attempted: Uuid,
    },
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        // No invariant spans a panic here; the map is always whole
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[allow(dead_code)] // Used in tests
    pub fn active_count(&self) -> usize {
        self.sessions().len()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, chat_id: &str) -> Option<Session> {
        self.sessions().get(chat_id).cloned()
    }

    fn create(&self, chat_id: &str, session: Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions();
        if sessions.contains_key(chat_id) {
            return Err(StoreError::AlreadyActive {
                chat_id: chat_id.to_string(),
            });
        }
        sessions.insert(chat_id.to_string(), session);
        Ok(())
    }

    fn update(&self, chat_id: &str, session: Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions();
        let Some(active) = sessions.get_mut(chat_id) else {
            return Err(StoreError::NoSession {
                chat_id: chat_id.to_string(),
            });
        };
        if active.id() != session.id() {
            return Err(StoreError::SessionMismatch {
                chat_id: chat_id.to_string(),
                active: active.id(),
                attempted: session.id(),
            });
        }
        *active = session;
        Ok(())
    }

    fn delete(&self, chat_id: &str) -> Option<Session> {
        self.sessions().remove(chat_id)
    }
}
