use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a match.
///
/// Transitions are driven outside the event pipeline; events are accepted
/// in any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    InProgress,
    Finished,
}

/// One side of a match with its denormalized team info and running score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSide {
    pub team_id: i64,
    pub name: CompactString,
    pub abbreviation: CompactString,
    pub score: i32,
}

/// Point-in-time view of a match served by the read path.
///
/// When served from the cache this may lag the stored aggregate by up to
/// the cache entry's TTL; a cache miss always reads live state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub id: i64,
    /// Calendar date of the match, `YYYY-MM-DD`.
    pub date: CompactString,
    pub season: CompactString,
    pub status: MatchStatus,
    /// Scheduled tip-off time, `HH:MM`.
    pub start_time: CompactString,
    pub home: TeamSide,
    pub visitor: TeamSide,
}

/// Response returned by the match listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchListResponse {
    pub matches: Vec<MatchSnapshot>,
}
