//! Service API handlers.
//!
//! The boundary surface for upstream collaborators: one publish endpoint
//! and the snapshot read endpoints.
//!
//! # Endpoints
//!
//! - `POST /events`                    – validate and publish a match event
//! - `GET  /matches/{match_id}`        – match snapshot (cache-aside)
//! - `GET  /matches?date=YYYY-MM-DD`   – a day's matches
//! - `GET  /matches/{match_id}/events` – recent ledger rows

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use courtside_core::publisher::PublishError;
use courtside_core::reader::SnapshotError;

use crate::state::AppState;

mod events;
mod matches;

/// Build the Service API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", post(events::record_event))
        .route("/matches", get(matches::list_matches))
        .route("/matches/{match_id}", get(matches::get_match))
        .route(
            "/matches/{match_id}/events",
            get(matches::list_match_events),
        )
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in API handlers.
#[derive(Debug)]
enum ApiError {
    /// The request failed validation.
    Validation(String),
    /// The event queue is not accepting messages.
    QueueUnavailable,
    /// The requested match was not found.
    NotFound,
    /// A database query failed.
    Database(sqlx::Error),
    /// Anything else that should read as a server fault.
    Internal(String),
}

impl From<PublishError> for ApiError {
    fn from(e: PublishError) -> Self {
        match e {
            PublishError::Validation(msg) => ApiError::Validation(msg.to_string()),
            PublishError::QueueUnavailable => ApiError::QueueUnavailable,
            PublishError::Encode(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<SnapshotError> for ApiError {
    fn from(e: SnapshotError) -> Self {
        match e {
            SnapshotError::NotFound(_) => ApiError::NotFound,
            SnapshotError::Database(e) => ApiError::Database(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::QueueUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "event queue unavailable").into_response()
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "match not found").into_response(),
            ApiError::Database(e) => {
                tracing::error!(error = %e, "API database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "API internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
