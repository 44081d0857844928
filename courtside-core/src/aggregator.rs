//! Transactional application of events to durable storage.

use crate::codec::EventEnvelope;
use crate::consumer::EventApplier;
use crate::entities::EventKind;
use crate::entities::ledger::LedgerInsert;
use crate::entities::match_row::{MatchSides, Side};
use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum AggregateError {
    /// The event references a match that does not exist. The caller drops
    /// the event; nothing was written.
    #[error("match {0} not found")]
    MatchNotFound(i64),

    /// The transaction aborted; ledger and aggregate are both untouched.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Applies one decoded event in a single storage transaction: append the
/// ledger row, and for score events atomically increment the matching
/// side's running total. Either both writes commit or neither does, so no
/// orphan ledger row can exist for an event that could not be scored.
///
/// Invocations for different events of one match may run concurrently;
/// the increments commute, so commit order does not matter.
pub struct ScoreAggregator {
    pool: PgPool,
}

impl ScoreAggregator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the server-assigned ledger id of the appended row.
    pub async fn apply_event(&self, event: &EventEnvelope) -> Result<i64, AggregateError> {
        let mut tx = self.pool.begin().await?;

        let sides = MatchSides::get_tx(&mut tx, event.match_id)
            .await?
            .ok_or(AggregateError::MatchNotFound(event.match_id))?;

        let ledger_id = LedgerInsert::from_envelope(event).insert_tx(&mut tx).await?;

        if event.kind == EventKind::Score && event.value > 0 {
            match side_for_team(&sides, event.team_id) {
                Some(side) => {
                    MatchSides::add_score_tx(&mut tx, event.match_id, side, event.value).await?;
                }
                None => {
                    // The ledger row still commits; the aggregate only
                    // counts events whose team is one of the match's sides.
                    warn!(
                        match_id = event.match_id,
                        team_id = event.team_id,
                        "score event for a team not in this match"
                    );
                }
            }
        }

        tx.commit().await?;

        debug!(
            match_id = event.match_id,
            ledger_id,
            kind = ?event.kind,
            value = event.value,
            "event applied"
        );
        Ok(ledger_id)
    }
}

/// Which side of the match `team_id` plays on, if either.
pub fn side_for_team(sides: &MatchSides, team_id: i64) -> Option<Side> {
    if team_id == sides.home_team_id {
        Some(Side::Home)
    } else if team_id == sides.visitor_team_id {
        Some(Side::Visitor)
    } else {
        None
    }
}

#[async_trait]
impl EventApplier for ScoreAggregator {
    async fn apply(&self, event: EventEnvelope) -> Result<(), AggregateError> {
        self.apply_event(&event).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_for_team_picks_the_matching_column() {
        let sides = MatchSides {
            id: 42,
            home_team_id: 7,
            visitor_team_id: 9,
        };
        assert_eq!(side_for_team(&sides, 7), Some(Side::Home));
        assert_eq!(side_for_team(&sides, 9), Some(Side::Visitor));
        assert_eq!(side_for_team(&sides, 11), None);
    }
}
