//! Mock implementations for testing
//!
//! These mocks enable runtime testing without real I/O.

use crate::guide::GenerationClient;
use crate::itinerary::Itinerary;
use crate::llm::LlmMessage;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Semaphore;

pub const DEFAULT_MOCK_REPLY: &str = "mock reply";

/// Generation client that returns queued results.
///
/// A gated client holds every call until `release` is called, which lets
/// tests observe the session while a request is outstanding.
pub struct MockGenerationClient {
    replies: Mutex<VecDeque<String>>,
    itineraries: Mutex<VecDeque<Option<Itinerary>>>,
    guide_calls: Mutex<Vec<(String, Vec<LlmMessage>)>>,
    itinerary_calls: Mutex<Vec<String>>,
    gate: Option<Semaphore>,
}

impl MockGenerationClient {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            itineraries: Mutex::new(VecDeque::new()),
            guide_calls: Mutex::new(Vec::new()),
            itinerary_calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    /// Queue a guide reply; unqueued calls get `DEFAULT_MOCK_REPLY`
    pub fn queue_reply(&self, text: impl Into<String>) {
        self.replies.lock().unwrap().push_back(text.into());
    }

    /// Queue an itinerary result; unqueued calls get `None`
    pub fn queue_itinerary(&self, itinerary: Option<Itinerary>) {
        self.itineraries.lock().unwrap().push_back(itinerary);
    }

    /// Let one held call complete
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn guide_calls(&self) -> Vec<(String, Vec<LlmMessage>)> {
        self.guide_calls.lock().unwrap().clone()
    }

    pub fn itinerary_calls(&self) -> Vec<String> {
        self.itinerary_calls.lock().unwrap().clone()
    }

    async fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
    }
}

impl Default for MockGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationClient for MockGenerationClient {
    async fn guide_response(&self, prompt: &str, history: &[LlmMessage]) -> String {
        self.guide_calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), history.to_vec()));
        self.wait_for_gate().await;
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| DEFAULT_MOCK_REPLY.to_string())
    }

    async fn generate_itinerary(&self, destination: &str) -> Option<Itinerary> {
        self.itinerary_calls
            .lock()
            .unwrap()
            .push(destination.to_string());
        self.wait_for_gate().await;
        self.itineraries.lock().unwrap().pop_front().flatten()
    }
}
