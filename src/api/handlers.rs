//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    CategoryQuery, DestinationsResponse, ErrorResponse, FilterRequest, IntentResponse,
    MessageRequest, SelectDestinationRequest, SessionResponse, SuccessResponse,
};
use super::AppState;
use crate::catalog::CategoryFilter;
use crate::runtime::{SessionError, SessionHandle, SessionSnapshot};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Catalog
        .route("/api/destinations", get(list_destinations))
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/stream", get(stream_session))
        // Intents
        .route("/api/sessions/:id/messages", post(submit_message))
        .route(
            "/api/sessions/:id/destination",
            post(select_destination).delete(dismiss_selection),
        )
        .route(
            "/api/sessions/:id/itinerary",
            post(request_itinerary).delete(dismiss_itinerary),
        )
        .route("/api/sessions/:id/filter", axum::routing::put(set_filter))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Catalog
// ============================================================

async fn list_destinations(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<DestinationsResponse>, AppError> {
    let filter = match query.category.as_deref() {
        Some(category) => parse_filter(category)?,
        None => CategoryFilter::All,
    };

    Ok(Json(DestinationsResponse {
        destinations: state.sessions.catalog().filtered(filter),
    }))
}

// ============================================================
// Session lifecycle
// ============================================================

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionResponse>) {
    let handle = state.sessions.create().await;
    tracing::info!(session_id = %handle.id(), "Session created");
    (
        StatusCode::CREATED,
        Json(session_response(&state, handle.snapshot())),
    )
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let handle = state.sessions.get(&id).await?;
    Ok(Json(session_response(&state, handle.snapshot())))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.remove(&id).await?;
    tracing::info!(session_id = %id, "Session removed");
    Ok(Json(SuccessResponse { success: true }))
}

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let handle = state.sessions.get(&id).await?;
    Ok(sse_stream(handle.subscribe()))
}

// ============================================================
// Intents
// ============================================================

async fn submit_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<IntentResponse>, AppError> {
    let outcome = session(&state, &id).await?.submit_message(req.text).await?;
    Ok(Json(outcome.into()))
}

async fn select_destination(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SelectDestinationRequest>,
) -> Result<Json<IntentResponse>, AppError> {
    let outcome = state
        .sessions
        .select_destination(&id, &req.destination_id)
        .await?;
    Ok(Json(outcome.into()))
}

async fn dismiss_selection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<IntentResponse>, AppError> {
    let outcome = session(&state, &id).await?.dismiss_selection().await?;
    Ok(Json(outcome.into()))
}

async fn request_itinerary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<IntentResponse>, AppError> {
    let outcome = session(&state, &id).await?.request_itinerary().await?;
    Ok(Json(outcome.into()))
}

async fn dismiss_itinerary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<IntentResponse>, AppError> {
    let outcome = session(&state, &id).await?.dismiss_itinerary().await?;
    Ok(Json(outcome.into()))
}

async fn set_filter(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<FilterRequest>,
) -> Result<Json<IntentResponse>, AppError> {
    let filter = parse_filter(&req.category)?;
    let outcome = session(&state, &id)
        .await?
        .set_category_filter(filter)
        .await?;
    Ok(Json(outcome.into()))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> impl IntoResponse {
    env!("CARGO_PKG_VERSION")
}

// ============================================================
// Helpers
// ============================================================

async fn session(state: &AppState, id: &str) -> Result<SessionHandle, AppError> {
    Ok(state.sessions.get(id).await?)
}

fn session_response(state: &AppState, snapshot: SessionSnapshot) -> SessionResponse {
    SessionResponse {
        visible_destinations: state.sessions.catalog().filtered(snapshot.filter),
        session: snapshot,
    }
}

fn parse_filter(category: &str) -> Result<CategoryFilter, AppError> {
    category
        .parse()
        .map_err(|e: crate::catalog::CatalogError| AppError::BadRequest(e.to_string()))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::UnknownSession(_) | SessionError::UnknownDestination(_) => {
                AppError::NotFound(e.to_string())
            }
            SessionError::Closed => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
