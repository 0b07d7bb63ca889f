//! Runtime for running chat games
//!
//! One `ChatRuntime` task per chat processes that chat's events in order;
//! different chats run independently.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ChatRuntime;
pub use traits::*;

use crate::game::SessionView;
use crate::router::{CommandTokens, Inbound, InboundMessage, OutboundReply};
use crate::state_machine::{ChatContext, Event};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, RwLock};
use uuid::Uuid;

/// Type alias for production runtime with trait-object implementations
pub type ProductionRuntime = ChatRuntime<Arc<dyn SessionStore>, Arc<dyn AnswerOracle>>;

/// Live chat runtimes by chat id, shared with the runtimes themselves so an
/// idle one can remove itself
pub type ChatRegistry = Arc<RwLock<HashMap<String, ChatHandle>>>;

const EVENT_CHANNEL_CAPACITY: usize = 64;
const OUTBOUND_CHANNEL_CAPACITY: usize = 128;

/// Name credited when the transport has no display name for the sender
const DEFAULT_SENDER_NAME: &str = "User";

/// Errors from routing a message to a chat runtime
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Runtime for chat {chat_id} has stopped")]
    Stopped { chat_id: String },
}

/// Handle to interact with a running chat
#[derive(Clone)]
pub struct ChatHandle {
    pub event_tx: mpsc::Sender<Event>,
    pub broadcast_tx: broadcast::Sender<OutboundReply>,
}

/// Manager for all chat runtimes
pub struct RuntimeManager {
    store: Arc<dyn SessionStore>,
    oracle: Arc<dyn AnswerOracle>,
    questions: Arc<dyn QuestionProvider>,
    tokens: CommandTokens,
    runtimes: ChatRegistry,
}

impl RuntimeManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        oracle: Arc<dyn AnswerOracle>,
        questions: Arc<dyn QuestionProvider>,
        tokens: CommandTokens,
    ) -> Self {
        Self {
            store,
            oracle,
            questions,
            tokens,
            runtimes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Route one inbound chat message.
    ///
    /// Returns whether the message was handed to a chat runtime. Blank bodies
    /// are dropped, and guesses or resignations only reach a chat with an
    /// active round; anything else is ordinary chat.
    pub async fn dispatch(&self, message: InboundMessage) -> Result<bool, RuntimeError> {
        let InboundMessage {
            chat_id,
            sender_name,
            body,
        } = message;

        let event = match self.tokens.classify(&body) {
            Inbound::Empty => return Ok(false),
            Inbound::Start => Event::StartRequested {
                session_id: Uuid::new_v4(),
                question: self.questions.sample(),
            },
            Inbound::Resign => {
                if !self.has_round(&chat_id) {
                    return Ok(false);
                }
                Event::ResignRequested
            }
            Inbound::Text(text) => {
                if !self.has_round(&chat_id) {
                    return Ok(false);
                }
                let sender = if sender_name.trim().is_empty() {
                    DEFAULT_SENDER_NAME.to_string()
                } else {
                    sender_name
                };
                Event::GuessSubmitted {
                    guess_id: Uuid::new_v4(),
                    sender,
                    text,
                }
            }
        };

        self.send_event(&chat_id, event).await?;
        Ok(true)
    }

    /// Receive every reply the game emits to one chat, in emission order
    pub async fn subscribe(&self, chat_id: &str) -> broadcast::Receiver<OutboundReply> {
        {
            let runtimes = self.runtimes.read().await;
            if let Some(handle) = runtimes.get(chat_id) {
                return handle.broadcast_tx.subscribe();
            }
        }

        let mut runtimes = self.runtimes.write().await;
        self.ensure_running(&mut runtimes, chat_id)
            .broadcast_tx
            .subscribe()
    }

    /// Read-only snapshot of the chat's active round
    pub fn session_view(&self, chat_id: &str) -> Option<SessionView> {
        self.store.get(chat_id).map(|session| session.view())
    }

    fn has_round(&self, chat_id: &str) -> bool {
        self.store.get(chat_id).is_some()
    }

    #[allow(dead_code)] // Used in tests
    pub async fn is_running(&self, chat_id: &str) -> bool {
        self.runtimes
            .read()
            .await
            .get(chat_id)
            .is_some_and(|handle| !handle.event_tx.is_closed())
    }

    /// Queue an event for the chat's runtime, starting one if needed
    async fn send_event(&self, chat_id: &str, event: Event) -> Result<(), RuntimeError> {
        // Events are sent under the registry lock; a runtime only retires
        // while holding the write side, so nothing is queued into a dead channel
        let event = {
            let runtimes = self.runtimes.read().await;
            match runtimes.get(chat_id) {
                Some(handle) => match handle.event_tx.send(event).await {
                    Ok(()) => return Ok(()),
                    Err(mpsc::error::SendError(event)) => event,
                },
                None => event,
            }
        };

        let mut runtimes = self.runtimes.write().await;
        let handle = self.ensure_running(&mut runtimes, chat_id);
        let _runtimes = runtimes.downgrade();
        handle
            .event_tx
            .send(event)
            .await
            .map_err(|_| RuntimeError::Stopped {
                chat_id: chat_id.to_string(),
            })
    }

    /// Return the chat's live handle, replacing a runtime that has exited.
    ///
    /// A replacement keeps the chat's broadcast channel so existing
    /// subscribers see the new runtime's replies.
    fn ensure_running(
        &self,
        runtimes: &mut HashMap<String, ChatHandle>,
        chat_id: &str,
    ) -> ChatHandle {
        let broadcast_tx = match runtimes.get(chat_id) {
            Some(handle) if !handle.event_tx.is_closed() => return handle.clone(),
            Some(handle) => {
                tracing::warn!(%chat_id, "Chat runtime exited, restarting");
                handle.broadcast_tx.clone()
            }
            None => broadcast::channel(OUTBOUND_CHANNEL_CAPACITY).0,
        };

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let context = ChatContext::new(chat_id, self.tokens.clone());

        let runtime: ProductionRuntime = ChatRuntime::new(
            context,
            self.store.clone(),
            self.oracle.clone(),
            event_rx,
            event_tx.clone(),
            broadcast_tx.clone(),
            self.runtimes.clone(),
        );

        tokio::spawn(runtime.run());

        let handle = ChatHandle {
            event_tx,
            broadcast_tx,
        };
        runtimes.insert(chat_id.to_string(), handle.clone());
        handle
    }
}
