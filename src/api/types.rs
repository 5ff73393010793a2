//! API request and response types

use crate::catalog::Destination;
use crate::runtime::{Outcome, SessionSnapshot};
use serde::{Deserialize, Serialize};

/// Query for catalog listing
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

/// Request to select a catalog destination
#[derive(Debug, Deserialize)]
pub struct SelectDestinationRequest {
    pub destination_id: String,
}

/// Request to change the category filter (`All` or a category name)
#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub category: String,
}

/// Catalog listing
#[derive(Debug, Serialize)]
pub struct DestinationsResponse {
    pub destinations: Vec<Destination>,
}

/// Session snapshot plus the destinations its filter currently offers
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: SessionSnapshot,
    pub visible_destinations: Vec<Destination>,
}

/// Response for intents. The runtime has processed the intent by the time
/// this is sent; `applied` is false when it was ignored (empty message,
/// request already in flight, nothing selected).
#[derive(Debug, Serialize)]
pub struct IntentResponse {
    pub applied: bool,
}

impl From<Outcome> for IntentResponse {
    fn from(outcome: Outcome) -> Self {
        Self {
            applied: outcome.is_applied(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
