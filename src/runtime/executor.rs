//! Chat runtime executor

use super::traits::{AnswerOracle, SessionStore};
use super::ChatRegistry;

use crate::oracle::parse_verdict;
use crate::router::OutboundReply;
use crate::state_machine::{transition, ChatContext, ChatState, Effect, Event, TransitionError};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;

/// How often an idle runtime re-checks whether it can retire
const IDLE_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Runtime for one chat, generic over storage and oracle implementations
pub struct ChatRuntime<S, O>
where
    S: SessionStore + 'static,
    O: AnswerOracle + 'static,
{
    context: ChatContext,
    state: ChatState,
    store: S,
    oracle: Arc<O>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    outbound_tx: broadcast::Sender<OutboundReply>,
    registry: ChatRegistry,
    /// Inbound events held back while a verdict is pending, in arrival order
    deferred: VecDeque<Event>,
}

impl<S, O> ChatRuntime<S, O>
where
    S: SessionStore + 'static,
    O: AnswerOracle + 'static,
{
    pub fn new(
        context: ChatContext,
        store: S,
        oracle: O,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::Sender<Event>,
        outbound_tx: broadcast::Sender<OutboundReply>,
        registry: ChatRegistry,
    ) -> Self {
        let state = ChatState::from_stored(store.get(&context.chat_id));
        Self {
            context,
            state,
            store,
            oracle: Arc::new(oracle),
            event_rx,
            event_tx,
            outbound_tx,
            registry,
            deferred: VecDeque::new(),
        }
    }

    pub async fn run(mut self) {
        tracing::info!(chat_id = %self.context.chat_id, state = self.state.name(), "Starting chat runtime");

        let mut idle_check = tokio::time::interval(IDLE_CHECK_INTERVAL);
        idle_check.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Process events in a loop - no recursion
        loop {
            tokio::select! {
                event = self.event_rx.recv() => {
                    let Some(event) = event else { break };
                    self.process_event(event);
                    if self.try_retire() {
                        break;
                    }
                }
                _ = idle_check.tick() => {
                    if self.try_retire() {
                        break;
                    }
                }
            }
        }

        tracing::info!(chat_id = %self.context.chat_id, "Chat runtime stopped");
    }

    fn process_event(&mut self, event: Event) {
        // One verdict at a time per chat: everything else waits for it
        if self.state.is_judging() && !event.is_verdict() {
            tracing::debug!(
                chat_id = %self.context.chat_id,
                deferred = self.deferred.len() + 1,
                "Deferring event while verdict is pending"
            );
            self.deferred.push_back(event);
            return;
        }

        self.apply(event);

        while !self.state.is_judging() {
            let Some(next) = self.deferred.pop_front() else {
                break;
            };
            self.apply(next);
        }
    }

    /// Leave the registry once the chat has no round, no queued events and
    /// no subscribers. The next message for the chat starts a fresh runtime.
    fn try_retire(&mut self) -> bool {
        if !matches!(self.state, ChatState::Idle) || !self.deferred.is_empty() {
            return false;
        }

        // Senders hold the read side, so nothing can be queued past this check
        let Ok(mut runtimes) = self.registry.try_write() else {
            return false;
        };
        if !self.event_rx.is_empty() || self.outbound_tx.receiver_count() > 0 {
            return false;
        }

        let chat_id = &self.context.chat_id;
        if runtimes
            .get(chat_id)
            .is_some_and(|handle| handle.event_tx.same_channel(&self.event_tx))
        {
            runtimes.remove(chat_id);
        }
        self.event_rx.close();
        tracing::debug!(%chat_id, "Retiring idle chat runtime");
        true
    }

    fn apply(&mut self, event: Event) {
        // Pure state transition
        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(e @ TransitionError::StaleVerdict { .. }) => {
                tracing::debug!(chat_id = %self.context.chat_id, error = %e, "Discarding verdict");
                return;
            }
            Err(e) => {
                tracing::warn!(chat_id = %self.context.chat_id, error = %e, "Rejected event");
                return;
            }
        };

        let from = self.state.name();
        self.state = result.new_state;
        if from != self.state.name() {
            tracing::debug!(chat_id = %self.context.chat_id, from, to = self.state.name(), "State changed");
        }

        for effect in result.effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        let chat_id = &self.context.chat_id;
        match effect {
            Effect::CreateSession { session } => {
                let session_id = session.id();
                match self.store.create(chat_id, session) {
                    Ok(()) => tracing::info!(%chat_id, %session_id, "Round started"),
                    Err(e) => tracing::error!(%chat_id, error = %e, "Failed to create session"),
                }
            }

            Effect::UpdateSession { session } => {
                let score = session.score();
                match self.store.update(chat_id, session) {
                    Ok(()) => tracing::debug!(%chat_id, score, "Session updated"),
                    Err(e) => tracing::error!(%chat_id, error = %e, "Failed to update session"),
                }
            }

            Effect::DeleteSession => {
                if let Some(session) = self.store.delete(chat_id) {
                    tracing::info!(
                        %chat_id,
                        session_id = %session.id(),
                        score = session.score(),
                        found = session.found_count(),
                        "Round ended"
                    );
                }
            }

            Effect::Reply { text } => {
                // No subscribers is fine
                let _ = self.outbound_tx.send(OutboundReply {
                    chat_id: chat_id.clone(),
                    text,
                });
            }

            Effect::RequestVerdict {
                session_id,
                guess_id,
                request,
            } => {
                // Spawn oracle request as background task
                let oracle = self.oracle.clone();
                let event_tx = self.event_tx.clone();
                let chat_id = chat_id.clone();

                tokio::spawn(async move {
                    tracing::debug!(%chat_id, %guess_id, guess = %request.guess, "Asking oracle (background)");

                    let outcome = match oracle.ask(&request).await {
                        Ok(raw) => Ok(parse_verdict(&raw)),
                        Err(e) => {
                            tracing::error!(%chat_id, %guess_id, error = %e, "Oracle request failed");
                            Err(e)
                        }
                    };

                    let _ = event_tx
                        .send(Event::VerdictReceived {
                            session_id,
                            guess_id,
                            outcome,
                        })
                        .await;
                });
            }
        }
    }
}
