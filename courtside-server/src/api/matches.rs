use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use courtside_core::entities::ledger::{LedgerRecord, ListLedgerRecords};
use courtside_core::framework::DatabaseProcessor;
use courtside_sdk::objects::{MatchEventListResponse, MatchEventView, MatchListResponse};
use kanau::processor::Processor;
use serde::Deserialize;

use super::ApiError;
use crate::state::AppState;

/// `GET /matches/{match_id}` — match snapshot via the cache-aside path.
pub(super) async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.reader.match_snapshot(match_id).await?;
    Ok(Json(snapshot))
}

#[derive(Debug, Deserialize)]
pub(super) struct ListMatchesParams {
    date: String,
}

/// `GET /matches?date=YYYY-MM-DD` — the day's matches, earliest first.
pub(super) async fn list_matches(
    State(state): State<AppState>,
    Query(params): Query<ListMatchesParams>,
) -> Result<impl IntoResponse, ApiError> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    let date = time::Date::parse(&params.date, &format)
        .map_err(|_| ApiError::Validation(format!("invalid date: {}", params.date)))?;

    let matches = state.reader.matches_on(date).await?;
    Ok(Json(MatchListResponse { matches }))
}

const EVENT_LIST_LIMIT: i64 = 100;

/// `GET /matches/{match_id}/events` — recent ledger rows, newest first.
pub(super) async fn list_match_events(
    State(state): State<AppState>,
    Path(match_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let records = processor
        .process(ListLedgerRecords {
            match_id,
            limit: EVENT_LIST_LIMIT,
        })
        .await
        .map_err(ApiError::Database)?;

    let events = records.into_iter().map(to_event_view).collect();
    Ok(Json(MatchEventListResponse { events }))
}

/// Convert a ledger row (DB model) into a `MatchEventView` (API model).
fn to_event_view(record: LedgerRecord) -> MatchEventView {
    MatchEventView {
        id: record.id,
        match_id: record.match_id,
        player_id: record.player_id,
        team_id: record.team_id,
        kind: record.kind.into(),
        sub_type: record.sub_type,
        value: record.value,
        quarter: record.quarter,
        time_remaining: record.time_remaining,
        event_time: record.event_time,
        recorded_at: record.recorded_at.assume_utc().unix_timestamp(),
    }
}
