//! Session state types

use crate::catalog::{CategoryFilter, Destination};
use crate::itinerary::Itinerary;
use serde::Serialize;

/// Outstanding remote call, if any.
///
/// One value covers both call kinds, so at most one call is outstanding per
/// session. The tag only records which kind it is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Pending {
    #[default]
    Idle,
    Chat,
    Itinerary {
        destination: String,
    },
}

/// Everything about a session except the transcript, which the runtime
/// owns and appends to when executing effects.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SessionState {
    pub pending: Pending,
    pub selected: Option<Destination>,
    pub itinerary: Option<Itinerary>,
    pub filter: CategoryFilter,
}

impl SessionState {
    pub fn is_pending(&self) -> bool {
        !matches!(self.pending, Pending::Idle)
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected.as_ref().map(|d| d.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_is_idle() {
        let state = SessionState::default();
        assert!(!state.is_pending());
        assert_eq!(state.filter, CategoryFilter::All);
        assert!(state.selected_name().is_none());
    }

    #[test]
    fn test_pending_serialization() {
        assert_eq!(serde_json::to_value(Pending::Idle).unwrap(), json!({ "type": "idle" }));
        assert_eq!(
            serde_json::to_value(Pending::Itinerary {
                destination: "Kyoto".to_string()
            })
            .unwrap(),
            json!({ "type": "itinerary", "destination": "Kyoto" })
        );
    }
}
