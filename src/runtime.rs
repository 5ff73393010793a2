//! Runtime for executing sessions
//!
//! Each session runs on its own task. Intents arrive through a
//! `SessionHandle`; snapshots go out on a watch channel.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;

use crate::catalog::{Catalog, CategoryFilter, Destination};
use crate::guide::GenerationClient;
use crate::itinerary::Itinerary;
use crate::state_machine::{Event, Pending, SessionState, TransitionError};
use crate::transcript::{Message, Transcript};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch, RwLock};

pub const DEFAULT_HISTORY_TURNS: usize = 20;
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Most recent conversational turns sent with each guide request
    pub history_turns: usize,
    /// A session with no events for this long and nothing pending stops
    pub idle_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            history_turns: DEFAULT_HISTORY_TURNS,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    UnknownSession(String),
    #[error("Destination not found: {0}")]
    UnknownDestination(String),
    #[error("Session runtime has stopped")]
    Closed,
}

/// Whether the runtime applied an intent or ignored it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored,
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        self == Outcome::Applied
    }
}

impl From<&Result<(), TransitionError>> for Outcome {
    fn from(result: &Result<(), TransitionError>) -> Self {
        if result.is_ok() {
            Outcome::Applied
        } else {
            Outcome::Ignored
        }
    }
}

/// Read-only view of a session handed to the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub messages: Vec<Message>,
    pub selected: Option<Destination>,
    pub itinerary: Option<Itinerary>,
    pub pending: Pending,
    pub is_pending: bool,
    pub filter: CategoryFilter,
}

impl SessionSnapshot {
    pub fn new(session_id: &str, state: &SessionState, transcript: &Transcript) -> Self {
        Self {
            session_id: session_id.to_string(),
            messages: transcript.messages().to_vec(),
            selected: state.selected.clone(),
            itinerary: state.itinerary.clone(),
            pending: state.pending.clone(),
            is_pending: state.is_pending(),
            filter: state.filter,
        }
    }
}

/// Intent delivered to a session runtime, acknowledged once processed
#[derive(Debug)]
pub(crate) struct Intent {
    pub event: Event,
    pub ack: oneshot::Sender<Outcome>,
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    id: String,
    intent_tx: mpsc::Sender<Intent>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// True once the runtime has stopped
    pub fn is_closed(&self) -> bool {
        self.intent_tx.is_closed()
    }

    /// Deliver an intent and wait until the runtime has processed it
    async fn send(&self, event: Event) -> Result<Outcome, SessionError> {
        let (ack, ack_rx) = oneshot::channel();
        self.intent_tx
            .send(Intent { event, ack })
            .await
            .map_err(|_| SessionError::Closed)?;
        ack_rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn submit_message(&self, text: impl Into<String>) -> Result<Outcome, SessionError> {
        self.send(Event::SubmitMessage { text: text.into() }).await
    }

    pub async fn select_destination(
        &self,
        destination: Destination,
    ) -> Result<Outcome, SessionError> {
        self.send(Event::SelectDestination { destination }).await
    }

    pub async fn request_itinerary(&self) -> Result<Outcome, SessionError> {
        self.send(Event::RequestItinerary).await
    }

    pub async fn set_category_filter(
        &self,
        filter: CategoryFilter,
    ) -> Result<Outcome, SessionError> {
        self.send(Event::SetCategoryFilter { filter }).await
    }

    pub async fn dismiss_itinerary(&self) -> Result<Outcome, SessionError> {
        self.send(Event::DismissItinerary).await
    }

    pub async fn dismiss_selection(&self) -> Result<Outcome, SessionError> {
        self.send(Event::DismissSelection).await
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that sees every snapshot published from now on
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }
}

/// Manager for all session runtimes
pub struct SessionManager {
    catalog: Arc<Catalog>,
    client: Arc<dyn GenerationClient>,
    config: RuntimeConfig,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionManager {
    pub fn new(catalog: Arc<Catalog>, client: Arc<dyn GenerationClient>, config: RuntimeConfig) -> Self {
        Self {
            catalog,
            client,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Start a new session runtime, dropping sessions that have gone idle
    pub async fn create(&self) -> SessionHandle {
        let id = uuid::Uuid::now_v7().to_string();
        let handle = SessionRuntime::spawn(id.clone(), self.client.clone(), self.config.clone());

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, h| !h.is_closed());
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::info!(pruned, "Dropped idle sessions");
        }
        sessions.insert(id, handle.clone());
        handle
    }

    pub async fn get(&self, id: &str) -> Result<SessionHandle, SessionError> {
        let handle = self.sessions.read().await.get(id).cloned();
        match handle {
            Some(handle) if !handle.is_closed() => Ok(handle),
            Some(_) => {
                self.sessions.write().await.remove(id);
                Err(SessionError::UnknownSession(id.to_string()))
            }
            None => Err(SessionError::UnknownSession(id.to_string())),
        }
    }

    /// Forget a session. Its runtime stops once the last handle is dropped.
    pub async fn remove(&self, id: &str) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SessionError::UnknownSession(id.to_string()))
    }

    /// Select a catalog destination by id
    pub async fn select_destination(
        &self,
        session_id: &str,
        destination_id: &str,
    ) -> Result<Outcome, SessionError> {
        let destination = self
            .catalog
            .get(destination_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownDestination(destination_id.to_string()))?;
        self.get(session_id)
            .await?
            .select_destination(destination)
            .await
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockGenerationClient;
    use super::*;

    fn manager(config: RuntimeConfig) -> SessionManager {
        let catalog = Arc::new(Catalog::embedded().unwrap());
        SessionManager::new(catalog, Arc::new(MockGenerationClient::new()), config)
    }

    fn short_idle() -> RuntimeConfig {
        RuntimeConfig {
            idle_timeout: Duration::from_millis(50),
            ..RuntimeConfig::default()
        }
    }

    async fn wait_closed(handle: &SessionHandle) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !handle.is_closed() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("session never went idle");
    }

    #[tokio::test]
    async fn test_session_ids_are_unique_v7() {
        let manager = manager(RuntimeConfig::default());
        let a = manager.create().await;
        let b = manager.create().await;

        assert_ne!(a.id(), b.id());
        let parsed = uuid::Uuid::parse_str(a.id()).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
        assert_eq!(manager.session_count().await, 2);
        assert!(manager.get(b.id()).await.is_ok());
    }

    #[tokio::test]
    async fn test_select_unknown_destination() {
        let manager = manager(RuntimeConfig::default());
        let handle = manager.create().await;

        let err = manager
            .select_destination(handle.id(), "atlantis")
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::UnknownDestination(_)));

        let outcome = manager.select_destination(handle.id(), "kyoto").await.unwrap();
        assert!(outcome.is_applied());
    }

    #[tokio::test]
    async fn test_idle_session_stops_and_is_forgotten() {
        let manager = manager(short_idle());
        let idle = manager.create().await;
        let id = idle.id().to_string();
        wait_closed(&idle).await;

        assert!(matches!(
            manager.get(&id).await,
            Err(SessionError::UnknownSession(_))
        ));
        assert_eq!(manager.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_prunes_idle_sessions() {
        let manager = manager(short_idle());
        let idle = manager.create().await;
        wait_closed(&idle).await;

        let fresh = manager.create().await;
        assert_eq!(manager.session_count().await, 1);
        assert!(manager.get(fresh.id()).await.is_ok());
    }

    #[tokio::test]
    async fn test_activity_keeps_session_alive() {
        let config = RuntimeConfig {
            idle_timeout: Duration::from_millis(500),
            ..RuntimeConfig::default()
        };
        let manager = manager(config);
        let handle = manager.create().await;

        for _ in 0..8 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            handle.dismiss_itinerary().await.unwrap();
        }
        assert!(!handle.is_closed());
    }
}
