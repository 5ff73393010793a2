//! Pure state transition function
//!
//! Given the same state and event it always produces the same result, with
//! no I/O. Rejected intents come back as `TransitionError` and leave the
//! state untouched.

use super::{Effect, Event, Pending, SessionState};
use crate::system_prompt::ITINERARY_DAYS;
use crate::transcript::NewMessage;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons an event is ignored
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("A request is already in progress")]
    Busy,
    #[error("No destination selected")]
    NoSelection,
    #[error("Unexpected completion: {0}")]
    UnexpectedCompletion(&'static str),
}

pub fn itinerary_confirmation(destination: &str) -> String {
    format!(
        "I've prepared a special {ITINERARY_DAYS}-day journey for you in {destination}! \
         Check the details on your screen."
    )
}

pub fn transition(state: &SessionState, event: Event) -> Result<TransitionResult, TransitionError> {
    match event {
        // ============================================================
        // Chat
        // ============================================================
        Event::SubmitMessage { text } => {
            if text.trim().is_empty() {
                return Err(TransitionError::EmptyMessage);
            }
            if state.is_pending() {
                return Err(TransitionError::Busy);
            }

            // User text lands before the remote call is issued
            let new_state = SessionState {
                pending: Pending::Chat,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::append(NewMessage::user(text.clone())))
                .with_effect(Effect::PublishSnapshot)
                .with_effect(Effect::RequestGuide { prompt: text }))
        }

        Event::GuideReplied { text } => {
            if state.pending != Pending::Chat {
                return Err(TransitionError::UnexpectedCompletion("guide reply"));
            }
            let new_state = SessionState {
                pending: Pending::Idle,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::append(NewMessage::assistant(text)))
                .with_effect(Effect::PublishSnapshot))
        }

        // ============================================================
        // Destination selection
        // ============================================================
        Event::SelectDestination { destination } => {
            let new_state = SessionState {
                selected: Some(destination.clone()),
                itinerary: None,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::append(NewMessage::postcard(destination)))
                .with_effect(Effect::PublishSnapshot))
        }

        Event::DismissSelection => {
            if state.selected.is_none() && state.itinerary.is_none() {
                return Ok(TransitionResult::new(state.clone()));
            }
            let new_state = SessionState {
                selected: None,
                itinerary: None,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state).with_effect(Effect::PublishSnapshot))
        }

        Event::SetCategoryFilter { filter } => {
            if state.filter == filter {
                return Ok(TransitionResult::new(state.clone()));
            }
            let new_state = SessionState {
                filter,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state).with_effect(Effect::PublishSnapshot))
        }

        // ============================================================
        // Itinerary
        // ============================================================
        Event::RequestItinerary => {
            if state.is_pending() {
                return Err(TransitionError::Busy);
            }
            let destination = state
                .selected_name()
                .ok_or(TransitionError::NoSelection)?
                .to_string();

            let new_state = SessionState {
                pending: Pending::Itinerary {
                    destination: destination.clone(),
                },
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::PublishSnapshot)
                .with_effect(Effect::RequestItinerary { destination }))
        }

        Event::ItineraryGenerated {
            destination,
            itinerary,
        } => {
            match &state.pending {
                Pending::Itinerary { destination: requested } if *requested == destination => {}
                _ => return Err(TransitionError::UnexpectedCompletion("itinerary")),
            }

            let mut new_state = SessionState {
                pending: Pending::Idle,
                ..state.clone()
            };

            // The selection may have changed while the request was out
            if state.selected_name() != Some(destination.as_str()) {
                tracing::debug!(%destination, "Discarding itinerary for deselected destination");
                return Ok(TransitionResult::new(new_state).with_effect(Effect::PublishSnapshot));
            }

            let succeeded = itinerary.is_some();
            new_state.itinerary = itinerary;

            let mut result = TransitionResult::new(new_state);
            if succeeded {
                result = result.with_effect(Effect::append(NewMessage::assistant(
                    itinerary_confirmation(&destination),
                )));
            }
            Ok(result.with_effect(Effect::PublishSnapshot))
        }

        Event::DismissItinerary => {
            if state.itinerary.is_none() {
                return Ok(TransitionResult::new(state.clone()));
            }
            let new_state = SessionState {
                itinerary: None,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state).with_effect(Effect::PublishSnapshot))
        }
    }
}
