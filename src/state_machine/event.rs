//! Events that can occur in a session

use crate::catalog::{CategoryFilter, Destination};
use crate::itinerary::Itinerary;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User intents
    SubmitMessage {
        text: String,
    },
    SelectDestination {
        destination: Destination,
    },
    RequestItinerary,
    SetCategoryFilter {
        filter: CategoryFilter,
    },
    DismissItinerary,
    DismissSelection,

    // Generation completions
    GuideReplied {
        text: String,
    },
    ItineraryGenerated {
        /// Destination name the request was issued for
        destination: String,
        itinerary: Option<Itinerary>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::SubmitMessage { .. } => "submit_message",
            Event::SelectDestination { .. } => "select_destination",
            Event::RequestItinerary => "request_itinerary",
            Event::SetCategoryFilter { .. } => "set_category_filter",
            Event::DismissItinerary => "dismiss_itinerary",
            Event::DismissSelection => "dismiss_selection",
            Event::GuideReplied { .. } => "guide_replied",
            Event::ItineraryGenerated { .. } => "itinerary_generated",
        }
    }
}
