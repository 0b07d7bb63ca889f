//! Per-chat game state machine
//!
//! Pure transitions in the Elm style: `transition` maps a state and an event
//! to a new state plus effects, and the chat runtime performs the effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{ChatContext, ChatState, PendingGuess};
pub use transition::{transition, TransitionError};
