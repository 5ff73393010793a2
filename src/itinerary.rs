//! Generated day-by-day travel plans

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itinerary {
    pub destination: String,
    pub days: Vec<ItineraryDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryDay {
    pub day: u32,
    pub title: String,
    pub activities: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ItineraryError {
    #[error("response is not a valid itinerary document: {0}")]
    Parse(String),
    #[error("itinerary has no days")]
    NoDays,
    #[error("day {found} found where day {expected} was expected")]
    DayOutOfSequence { expected: u32, found: u32 },
    #[error("day {0} has an empty title")]
    EmptyTitle(u32),
}

impl Itinerary {
    /// Parse the model's JSON text and check the plan's structure
    pub fn from_json(text: &str) -> Result<Self, ItineraryError> {
        let itinerary: Itinerary = serde_json::from_str(strip_code_fence(text.trim()))
            .map_err(|e| ItineraryError::Parse(e.to_string()))?;
        itinerary.validate()?;
        Ok(itinerary)
    }

    /// Days must be numbered 1..=n in order, each with a title
    pub fn validate(&self) -> Result<(), ItineraryError> {
        if self.days.is_empty() {
            return Err(ItineraryError::NoDays);
        }
        for (expected, day) in (1u32..).zip(&self.days) {
            if day.day != expected {
                return Err(ItineraryError::DayOutOfSequence {
                    expected,
                    found: day.day,
                });
            }
            if day.title.trim().is_empty() {
                return Err(ItineraryError::EmptyTitle(day.day));
            }
        }
        Ok(())
    }

    /// Response schema for structured generation
    pub fn response_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "destination": { "type": "STRING" },
                "days": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "day": { "type": "INTEGER" },
                            "title": { "type": "STRING" },
                            "activities": {
                                "type": "ARRAY",
                                "items": { "type": "STRING" }
                            }
                        },
                        "required": ["day", "title", "activities"]
                    }
                }
            },
            "required": ["destination", "days"]
        })
    }
}

/// Some models wrap JSON output in a markdown fence even in JSON mode
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
