//! Effects produced by state transitions

use crate::transcript::NewMessage;

/// Effects to be executed after state transition, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a message to the transcript
    AppendMessage(NewMessage),

    /// Publish a fresh snapshot to observers
    PublishSnapshot,

    /// Ask the guide for a reply to the latest user message
    RequestGuide { prompt: String },

    /// Ask for an itinerary for the named destination
    RequestItinerary { destination: String },
}

impl Effect {
    pub fn append(message: NewMessage) -> Self {
        Effect::AppendMessage(message)
    }

    #[cfg(test)]
    pub fn is_remote_call(&self) -> bool {
        matches!(
            self,
            Effect::RequestGuide { .. } | Effect::RequestItinerary { .. }
        )
    }
}
