//! Session runtime executor

use super::{Intent, Outcome, RuntimeConfig, SessionHandle, SessionSnapshot};
use crate::guide::GenerationClient;
use crate::state_machine::{transition, Effect, Event, SessionState, TransitionError};
use crate::transcript::Transcript;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Owns one session's state and transcript, and runs the effects the state
/// machine asks for
pub struct SessionRuntime<G: GenerationClient + ?Sized + 'static> {
    session_id: String,
    state: SessionState,
    transcript: Transcript,
    client: Arc<G>,
    config: RuntimeConfig,
    intent_rx: mpsc::Receiver<Intent>,
    /// Generation results come back through here
    completion_rx: mpsc::Receiver<Event>,
    completion_tx: mpsc::Sender<Event>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl<G: GenerationClient + ?Sized + 'static> SessionRuntime<G> {
    /// Start a runtime on a background task and return its handle
    pub fn spawn(session_id: String, client: Arc<G>, config: RuntimeConfig) -> SessionHandle {
        let (intent_tx, intent_rx) = mpsc::channel(32);
        let (completion_tx, completion_rx) = mpsc::channel(4);

        let state = SessionState::default();
        let transcript = Transcript::with_welcome();
        let (snapshot_tx, snapshot_rx) =
            watch::channel(SessionSnapshot::new(&session_id, &state, &transcript));

        let runtime = Self {
            session_id: session_id.clone(),
            state,
            transcript,
            client,
            config,
            intent_rx,
            completion_rx,
            completion_tx,
            snapshot_tx,
        };
        tokio::spawn(runtime.run());

        SessionHandle {
            id: session_id,
            intent_tx,
            snapshot_rx,
        }
    }

    async fn run(mut self) {
        tracing::info!(session_id = %self.session_id, "Starting session runtime");

        let idle = tokio::time::sleep(self.config.idle_timeout);
        tokio::pin!(idle);

        // Remote calls run on their own tasks, so intents raised while one is
        // outstanding are evaluated right away rather than queueing behind it
        loop {
            tokio::select! {
                Some(event) = self.completion_rx.recv() => {
                    // Nobody waits on completions; the outcome is only logged
                    let _ = self.process_event(event);
                }
                intent = self.intent_rx.recv() => {
                    let Some(Intent { event, ack }) = intent else {
                        break;
                    };
                    let outcome = Outcome::from(&self.process_event(event));
                    let _ = ack.send(outcome);
                }
                () = &mut idle, if !self.state.is_pending() => {
                    tracing::info!(
                        session_id = %self.session_id,
                        idle_secs = self.config.idle_timeout.as_secs(),
                        "Session idle"
                    );
                    break;
                }
            }
            idle.as_mut().reset(tokio::time::Instant::now() + self.config.idle_timeout);
        }

        tracing::info!(session_id = %self.session_id, "Session runtime stopped");
    }

    fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let event_name = event.name();

        let result = match transition(&self.state, event) {
            Ok(r) => r,
            Err(e) => {
                // Rejected intents are not surfaced to the user
                tracing::debug!(
                    session_id = %self.session_id,
                    event = event_name,
                    reason = %e,
                    "Event ignored"
                );
                return Err(e);
            }
        };

        tracing::debug!(
            session_id = %self.session_id,
            event = event_name,
            effects = result.effects.len(),
            "Event applied"
        );

        self.state = result.new_state;
        for effect in result.effects {
            self.execute_effect(effect);
        }
        Ok(())
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendMessage(message) => {
                let stored = self.transcript.append(message);
                tracing::debug!(
                    session_id = %self.session_id,
                    message_id = %stored.id,
                    role = ?stored.role,
                    postcard = stored.is_postcard,
                    "Message appended"
                );
            }

            Effect::PublishSnapshot => {
                self.snapshot_tx.send_replace(SessionSnapshot::new(
                    &self.session_id,
                    &self.state,
                    &self.transcript,
                ));
            }

            Effect::RequestGuide { prompt } => {
                let history = self.transcript.chat_history(self.config.history_turns);
                let client = self.client.clone();
                let completion_tx = self.completion_tx.clone();
                let session_id = self.session_id.clone();

                tokio::spawn(async move {
                    tracing::info!(%session_id, turns = history.len(), "Requesting guide reply");
                    let text = client.guide_response(&prompt, &history).await;
                    let _ = completion_tx.send(Event::GuideReplied { text }).await;
                });
            }

            Effect::RequestItinerary { destination } => {
                let client = self.client.clone();
                let completion_tx = self.completion_tx.clone();
                let session_id = self.session_id.clone();

                tokio::spawn(async move {
                    tracing::info!(%session_id, %destination, "Requesting itinerary");
                    let itinerary = client.generate_itinerary(&destination).await;
                    let _ = completion_tx
                        .send(Event::ItineraryGenerated {
                            destination,
                            itinerary,
                        })
                        .await;
                });
            }
        }
    }
}
