//! Generation client for the travel guide
//!
//! Wraps the two remote calls the session needs: free-form guide chat and
//! schema-constrained itinerary generation. Every failure is absorbed here:
//! chat falls back to a fixed apology, itineraries fall back to `None`.

use crate::itinerary::Itinerary;
use crate::llm::{LlmMessage, LlmRequest, LlmService, MessageRole};
use crate::system_prompt::{itinerary_prompt, GUIDE_PERSONA};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Shown when the service answers with no text
pub const EMPTY_REPLY_FALLBACK: &str =
    "I'm sorry, I seem to have lost my map! Can you repeat that?";

/// Shown when the call fails outright
pub const ERROR_REPLY_FALLBACK: &str =
    "I hit a bit of a roadblock on our journey. Let's try again!";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// The session's view of the generation service
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Free-form guide reply. Sends `history` when non-empty, otherwise just
    /// `prompt`. Always returns displayable text.
    async fn guide_response(&self, prompt: &str, history: &[LlmMessage]) -> String;

    /// Structured plan for `destination`, or `None` if none could be produced
    async fn generate_itinerary(&self, destination: &str) -> Option<Itinerary>;
}

#[async_trait]
impl<T: GenerationClient + ?Sized> GenerationClient for Arc<T> {
    async fn guide_response(&self, prompt: &str, history: &[LlmMessage]) -> String {
        (**self).guide_response(prompt, history).await
    }

    async fn generate_itinerary(&self, destination: &str) -> Option<Itinerary> {
        (**self).generate_itinerary(destination).await
    }
}

/// Production client backed by an LLM service
pub struct GuideClient {
    llm: Arc<dyn LlmService>,
    request_timeout: Duration,
}

impl GuideClient {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self {
            llm,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    fn chat_request(prompt: &str, history: &[LlmMessage]) -> LlmRequest {
        let messages = if history.is_empty() {
            vec![LlmMessage::user(prompt)]
        } else {
            normalize_history(history)
        };
        LlmRequest {
            system: vec![],
            messages,
            response_schema: None,
        }
        .with_system(GUIDE_PERSONA)
    }
}

#[async_trait]
impl GenerationClient for GuideClient {
    async fn guide_response(&self, prompt: &str, history: &[LlmMessage]) -> String {
        let request = Self::chat_request(prompt, history);

        match timeout(self.request_timeout, self.llm.complete(&request)).await {
            Ok(Ok(response)) => {
                let text = response.text.trim();
                if text.is_empty() {
                    tracing::warn!(
                        finish_reason = ?response.finish_reason,
                        "Guide reply was empty"
                    );
                    EMPTY_REPLY_FALLBACK.to_string()
                } else {
                    text.to_string()
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e.message, kind = ?e.kind, "Guide reply failed");
                ERROR_REPLY_FALLBACK.to_string()
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.request_timeout.as_secs(),
                    "Guide reply timed out"
                );
                ERROR_REPLY_FALLBACK.to_string()
            }
        }
    }

    async fn generate_itinerary(&self, destination: &str) -> Option<Itinerary> {
        let destination = destination.trim();
        if destination.is_empty() {
            tracing::warn!("Itinerary requested for a blank destination");
            return None;
        }

        let request =
            LlmRequest::prompt(itinerary_prompt(destination)).with_schema(Itinerary::response_schema());

        let response = match timeout(self.request_timeout, self.llm.complete(&request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(%destination, error = %e.message, kind = ?e.kind, "Itinerary request failed");
                return None;
            }
            Err(_) => {
                tracing::warn!(%destination, "Itinerary request timed out");
                return None;
            }
        };

        match Itinerary::from_json(&response.text) {
            Ok(itinerary) => {
                tracing::debug!(%destination, days = itinerary.days.len(), "Itinerary generated");
                Some(itinerary)
            }
            Err(e) => {
                tracing::warn!(%destination, error = %e, "Itinerary response rejected");
                None
            }
        }
    }
}

/// Shape history the way the service expects it: the conversation opens with
/// a user turn and roles alternate. Same-role runs are merged.
fn normalize_history(history: &[LlmMessage]) -> Vec<LlmMessage> {
    let mut out: Vec<LlmMessage> = Vec::with_capacity(history.len());
    for msg in history
        .iter()
        .skip_while(|m| m.role == MessageRole::Assistant)
        .filter(|m| !m.text.trim().is_empty())
    {
        match out.last_mut() {
            Some(last) if last.role == msg.role => {
                last.text.push_str("\n\n");
                last.text.push_str(&msg.text);
            }
            _ => out.push(msg.clone()),
        }
    }
    out
}
