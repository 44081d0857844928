pub mod ledger;
pub mod match_row;

use courtside_sdk::objects::{EventKind as SdkEventKind, MatchStatus as SdkMatchStatus};
use serde::{Deserialize, Serialize};

/// Match event kind for database and wire operations.
///
/// This is the sqlx::Type version, stored as SMALLINT and carried on the
/// wire as the same integer code. For API/DTO use, see
/// `courtside_sdk::objects::EventKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(try_from = "i16", into = "i16")]
#[repr(i16)]
pub enum EventKind {
    Score = 1,
    Foul = 2,
    Substitution = 3,
    Turnover = 4,
    Rebound = 5,
}

impl From<EventKind> for i16 {
    fn from(value: EventKind) -> Self {
        value as i16
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

/// An event kind code outside the known enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown event kind code: {0}")]
pub struct UnknownEventKind(pub i16);

impl From<EventKind> for SdkEventKind {
    fn from(value: EventKind) -> Self {
        match value {
            EventKind::Score => SdkEventKind::Score,
            EventKind::Foul => SdkEventKind::Foul,
            EventKind::Substitution => SdkEventKind::Substitution,
            EventKind::Turnover => SdkEventKind::Turnover,
            EventKind::Rebound => SdkEventKind::Rebound,
        }
    }
}

impl From<SdkEventKind> for EventKind {
    fn from(value: SdkEventKind) -> Self {
        match value {
            SdkEventKind::Score => EventKind::Score,
            SdkEventKind::Foul => EventKind::Foul,
            SdkEventKind::Substitution => EventKind::Substitution,
            SdkEventKind::Turnover => EventKind::Turnover,
            SdkEventKind::Rebound => EventKind::Rebound,
        }
    }
}

/// Match lifecycle status for database operations.
///
/// The pipeline never enforces transitions; status changes happen outside
/// it, and events are accepted in any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[repr(i16)]
pub enum MatchStatus {
    Scheduled = 0,
    InProgress = 1,
    Finished = 2,
}

impl From<MatchStatus> for SdkMatchStatus {
    fn from(value: MatchStatus) -> Self {
        match value {
            MatchStatus::Scheduled => SdkMatchStatus::Scheduled,
            MatchStatus::InProgress => SdkMatchStatus::InProgress,
            MatchStatus::Finished => SdkMatchStatus::Finished,
        }
    }
}

impl From<SdkMatchStatus> for MatchStatus {
    fn from(value: SdkMatchStatus) -> Self {
        match value {
            SdkMatchStatus::Scheduled => MatchStatus::Scheduled,
            SdkMatchStatus::InProgress => MatchStatus::InProgress,
            SdkMatchStatus::Finished => MatchStatus::Finished,
        }
    }
}
