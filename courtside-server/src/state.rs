//! Application state shared across all request handlers.

use courtside_core::publisher::EventPublisher;
use courtside_core::reader::MatchReader;
use sqlx::PgPool;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (direct queries, e.g. ledger listings).
    pub db: PgPool,
    /// Publish side of the event pipeline.
    pub publisher: Arc<EventPublisher>,
    /// Cache-aside snapshot read path.
    pub reader: Arc<MatchReader>,
}

impl AppState {
    pub fn new(db: PgPool, publisher: Arc<EventPublisher>, reader: Arc<MatchReader>) -> Self {
        Self {
            db,
            publisher,
            reader,
        }
    }
}
