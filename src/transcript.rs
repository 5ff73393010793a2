//! Conversation transcript records

use crate::catalog::Destination;
use crate::llm::{LlmMessage, MessageRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const WELCOME_MESSAGE: &str = "Welcome, fellow traveler! I'm Vagabond, your AI Tour Guide. \
Where shall we explore today? Click a pin on the map or ask me anything about world wonders!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// A message the state machine wants appended. The runtime assigns the id
/// and timestamp when it lands in the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub role: Role,
    pub content: String,
    pub postcard: Option<Destination>,
}

impl NewMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            postcard: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            postcard: None,
        }
    }

    pub fn postcard(destination: Destination) -> Self {
        Self {
            role: Role::Assistant,
            content: format!("Exploring {}...", destination.name),
            postcard: Some(destination),
        }
    }
}

/// One transcript entry. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_postcard: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcard: Option<Destination>,
}

/// Append-only, insertion-ordered message list
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Transcript seeded with the guide's greeting
    pub fn with_welcome() -> Self {
        let mut transcript = Self::default();
        transcript.append(NewMessage::assistant(WELCOME_MESSAGE));
        transcript
    }

    /// Stamp and append a message, returning the stored record
    pub fn append(&mut self, new: NewMessage) -> &Message {
        // v7 ids are time-ordered and unique even within one millisecond
        let message = Message {
            id: uuid::Uuid::now_v7().to_string(),
            role: new.role,
            content: new.content,
            timestamp: Utc::now(),
            is_postcard: new.postcard.is_some(),
            postcard: new.postcard,
        };
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Conversational turns for the guide, oldest first, capped at the most
    /// recent `max_turns`. Postcards are display-only and left out.
    pub fn chat_history(&self, max_turns: usize) -> Vec<LlmMessage> {
        let turns: Vec<LlmMessage> = self
            .messages
            .iter()
            .filter(|m| !m.is_postcard)
            .map(|m| LlmMessage {
                role: m.role.into(),
                text: m.content.clone(),
            })
            .collect();
        let skip = turns.len().saturating_sub(max_turns);
        turns.into_iter().skip(skip).collect()
    }
}

impl From<Role> for MessageRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => MessageRole::User,
            Role::Assistant => MessageRole::Assistant,
        }
    }
}
