//! Cache-aside read path for match snapshots.

use std::sync::Arc;

use crate::cache::{SnapshotCache, snapshot_cache_key};
use crate::entities::match_row::{GetMatchSnapshot, ListMatchesByDate, MatchSnapshotRow};
use crate::framework::DatabaseProcessor;
use courtside_sdk::objects::MatchSnapshot;
use kanau::processor::Processor;
use sqlx::PgPool;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Storage has no such match; distinct from a storage failure.
    #[error("match {0} not found")]
    NotFound(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Serves match snapshots: cache first, storage on a miss.
///
/// A hit is returned as-is with no freshness check, so it may lag the
/// aggregate by up to the entry's TTL. A miss reads live state and does
/// NOT populate the cache — population belongs to external writers of the
/// cache capability, not to this path. Reads never mutate the aggregate.
pub struct MatchReader {
    processor: DatabaseProcessor,
    cache: Arc<dyn SnapshotCache>,
}

impl MatchReader {
    pub fn new(pool: PgPool, cache: Arc<dyn SnapshotCache>) -> Self {
        Self {
            processor: DatabaseProcessor { pool },
            cache,
        }
    }

    pub async fn match_snapshot(&self, match_id: i64) -> Result<MatchSnapshot, SnapshotError> {
        let key = snapshot_cache_key(match_id);
        if let Some(raw) = self.cache.get(&key) {
            match serde_json::from_slice::<MatchSnapshot>(&raw) {
                Ok(snapshot) => return Ok(snapshot),
                // Treated as a miss; the entry ages out at its TTL.
                Err(e) => {
                    warn!(match_id, error = %e, "undecodable cache entry, reading storage");
                }
            }
        }

        let row = self
            .processor
            .process(GetMatchSnapshot { match_id })
            .await?
            .ok_or(SnapshotError::NotFound(match_id))?;
        Ok(row.into_snapshot())
    }

    /// The day's matches ordered by tip-off time. Storage only; the cache
    /// holds single-match snapshots.
    pub async fn matches_on(&self, date: time::Date) -> Result<Vec<MatchSnapshot>, SnapshotError> {
        let rows = self.processor.process(ListMatchesByDate { date }).await?;
        Ok(rows
            .into_iter()
            .map(MatchSnapshotRow::into_snapshot)
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use bytes::Bytes;
    use courtside_sdk::objects::{MatchStatus, TeamSide};
    use std::time::Duration;

    fn snapshot() -> MatchSnapshot {
        MatchSnapshot {
            id: 42,
            date: "2024-03-01".into(),
            season: "2023-24".into(),
            status: MatchStatus::InProgress,
            start_time: "19:30".into(),
            home: TeamSide {
                team_id: 7,
                name: "Hawks".into(),
                abbreviation: "ATL".into(),
                score: 88,
            },
            visitor: TeamSide {
                team_id: 9,
                name: "Celtics".into(),
                abbreviation: "BOS".into(),
                score: 90,
            },
        }
    }

    // A lazy pool never opens a connection unless a query runs, which lets
    // these tests prove whether the cache path touched storage.
    fn lazy_pool() -> PgPool {
        PgPool::connect_lazy("postgres://courtside-reader-test-unreachable/courtside").unwrap()
    }

    #[tokio::test]
    async fn cache_hit_is_served_without_storage() {
        let cache = Arc::new(MemoryCache::new());
        let expected = snapshot();
        cache.set(
            &snapshot_cache_key(42),
            Bytes::from(serde_json::to_vec(&expected).unwrap()),
            Duration::from_secs(60),
        );

        let reader = MatchReader::new(lazy_pool(), cache);
        let got = reader.match_snapshot(42).await.unwrap();
        assert_eq!(got, expected);
    }

    #[tokio::test]
    async fn corrupt_cache_entry_falls_through_to_storage() {
        let cache = Arc::new(MemoryCache::new());
        cache.set(
            &snapshot_cache_key(42),
            Bytes::from_static(b"not a snapshot"),
            Duration::from_secs(60),
        );

        let reader = MatchReader::new(lazy_pool(), cache);
        // The fall-through hits the unreachable pool, so the error must be
        // a storage error, not a decode error and not a served hit.
        let err = reader.match_snapshot(42).await.unwrap_err();
        assert!(matches!(err, SnapshotError::Database(_)));
    }
}
