use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Kind of a match event, carried on the wire as a small integer under the
/// field name `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum EventKind {
    Score,
    Foul,
    Substitution,
    Turnover,
    Rebound,
}

impl From<EventKind> for i16 {
    fn from(value: EventKind) -> Self {
        match value {
            EventKind::Score => 1,
            EventKind::Foul => 2,
            EventKind::Substitution => 3,
            EventKind::Turnover => 4,
            EventKind::Rebound => 5,
        }
    }
}

impl TryFrom<i16> for EventKind {
    type Error = UnknownEventKind;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(EventKind::Score),
            2 => Ok(EventKind::Foul),
            3 => Ok(EventKind::Substitution),
            4 => Ok(EventKind::Turnover),
            5 => Ok(EventKind::Rebound),
            other => Err(UnknownEventKind(other)),
        }
    }
}

/// The wire carried an event kind code this version does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown event kind code: {0}")]
pub struct UnknownEventKind(pub i16);

/// Request payload for recording a live match event.
///
/// Sent by upstream collaborators (scoreboard feeds, the gateway) to the
/// ingestion API. `event_time` is advisory; the server stamps its own
/// ingestion timestamp when the event reaches the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEventRequest {
    pub match_id: i64,
    pub player_id: i64,
    pub team_id: i64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Sub-classification of the kind, e.g. "3pt", "dunk", "layup".
    #[serde(default)]
    pub sub_type: CompactString,
    /// Point contribution for score events.
    #[serde(default)]
    pub value: i32,
    #[serde(default = "default_quarter")]
    pub quarter: i16,
    /// Game clock at the moment of the event, e.g. "10:23".
    #[serde(default)]
    pub time_remaining: CompactString,
    #[serde(default)]
    pub event_time: CompactString,
}

fn default_quarter() -> i16 {
    1
}

/// Response returned by the event ingestion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordEventResponse {
    pub success: bool,
    pub message: CompactString,
}

/// One ledger row as served by the match events listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEventView {
    /// Server-assigned, monotonically increasing ledger id.
    pub id: i64,
    pub match_id: i64,
    pub player_id: i64,
    pub team_id: i64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub sub_type: CompactString,
    pub value: i32,
    pub quarter: i16,
    pub time_remaining: CompactString,
    /// Advisory, client-supplied.
    pub event_time: CompactString,
    /// Server ingestion timestamp, unix seconds.
    pub recorded_at: i64,
}

/// Response returned by the match events listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEventListResponse {
    pub events: Vec<MatchEventView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_round_trips_through_integer_codes() {
        for kind in [
            EventKind::Score,
            EventKind::Foul,
            EventKind::Substitution,
            EventKind::Turnover,
            EventKind::Rebound,
        ] {
            let code = i16::from(kind);
            assert_eq!(EventKind::try_from(code).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_code_is_rejected() {
        assert_eq!(EventKind::try_from(99), Err(UnknownEventKind(99)));
        assert!(serde_json::from_str::<EventKind>("99").is_err());
    }

    #[test]
    fn request_uses_wire_field_names() {
        let request: RecordEventRequest = serde_json::from_str(
            r#"{
                "match_id": 42,
                "player_id": 23,
                "team_id": 7,
                "type": 1,
                "sub_type": "3pt",
                "value": 3,
                "quarter": 4,
                "time_remaining": "00:12",
                "event_time": "2024-03-01T19:55:02Z"
            }"#,
        )
        .unwrap();
        assert_eq!(request.kind, EventKind::Score);
        assert_eq!(request.value, 3);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], 1);
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn optional_request_fields_default() {
        let request: RecordEventRequest = serde_json::from_str(
            r#"{"match_id": 1, "player_id": 2, "team_id": 3, "type": 2}"#,
        )
        .unwrap();
        assert_eq!(request.quarter, 1);
        assert_eq!(request.value, 0);
        assert!(request.sub_type.is_empty());
    }
}
