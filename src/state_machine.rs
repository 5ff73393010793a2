//! Session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! intents and generation completions come in as events, the transition
//! function returns the next state plus the effects the runtime must run.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{Pending, SessionState};
pub use transition::{transition, TransitionError};
