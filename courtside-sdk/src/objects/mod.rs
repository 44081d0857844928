pub mod event;
pub mod match_view;

pub use event::{
    EventKind, MatchEventListResponse, MatchEventView, RecordEventRequest, RecordEventResponse,
    UnknownEventKind,
};
pub use match_view::{MatchListResponse, MatchSnapshot, MatchStatus, TeamSide};
