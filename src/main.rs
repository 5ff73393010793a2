//! Vagabond - conversational travel guide
//!
//! A Rust backend running one session state machine per visitor: chat with
//! the guide, pick destinations from the catalog, and request itineraries.

mod api;
mod catalog;
mod guide;
mod itinerary;
mod llm;
mod runtime;
mod state_machine;
mod system_prompt;
mod transcript;

use api::{create_router, AppState};
use catalog::Catalog;
use guide::{GuideClient, DEFAULT_REQUEST_TIMEOUT};
use llm::{LlmConfig, LlmService, OfflineService};
use runtime::{RuntimeConfig, SessionManager, DEFAULT_HISTORY_TURNS, DEFAULT_IDLE_TIMEOUT};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vagabond=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let port: u16 = env_parse("VAGABOND_PORT").unwrap_or(8000);
    let request_timeout = env_parse("VAGABOND_LLM_TIMEOUT_SECS")
        .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs);
    let history_turns = env_parse("VAGABOND_HISTORY_TURNS").unwrap_or(DEFAULT_HISTORY_TURNS);
    let idle_timeout = env_parse("VAGABOND_SESSION_IDLE_SECS")
        .map_or(DEFAULT_IDLE_TIMEOUT, Duration::from_secs);
    let catalog_path = std::env::var("VAGABOND_CATALOG").ok().map(PathBuf::from);

    // Destination catalog
    let catalog = Catalog::load(catalog_path.as_deref())?;
    tracing::info!(
        destinations = catalog.len(),
        source = catalog_path
            .as_deref()
            .map_or_else(|| "embedded".to_string(), |p| p.display().to_string()),
        "Catalog loaded"
    );

    if catalog.is_empty() {
        tracing::warn!("Catalog has no destinations; selection will always fail");
    }

    // Generation service
    let llm: Arc<dyn LlmService> = if let Some(service) = LlmConfig::from_env().build_service()? {
        tracing::info!(model = %service.model_id(), "LLM service initialized");
        service
    } else {
        tracing::warn!(
            "No LLM API key configured. Set GEMINI_API_KEY or LLM_GATEWAY; guide replies will fall back."
        );
        Arc::new(OfflineService)
    };
    let guide = GuideClient::new(llm).with_timeout(request_timeout);

    // Create application state
    let sessions = SessionManager::new(
        Arc::new(catalog),
        Arc::new(guide),
        RuntimeConfig {
            history_turns,
            idle_timeout,
        },
    );
    let state = AppState::new(sessions);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Vagabond server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
