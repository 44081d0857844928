use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use compact_str::CompactString;
use courtside_sdk::objects::{RecordEventRequest, RecordEventResponse};

use super::ApiError;
use crate::state::AppState;

/// `POST /events` — validate and publish a match event.
///
/// 202 means the event is queued, not yet applied: aggregation happens
/// asynchronously, in per-match order. Validation failures are the
/// caller's to fix; queue failures are the caller's to retry.
pub(super) async fn record_event(
    State(state): State<AppState>,
    Json(body): Json<RecordEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.publisher.publish(body).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(RecordEventResponse {
            success: true,
            message: CompactString::from("event accepted"),
        }),
    ))
}
