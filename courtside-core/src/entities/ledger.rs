use crate::codec::EventEnvelope;
use crate::entities::EventKind;
use crate::framework::DatabaseProcessor;
use compact_str::CompactString;
use kanau::processor::Processor;

/// One append-only ledger row per successfully processed event.
///
/// `id` and `recorded_at` are server-assigned; the client-supplied
/// `event_time` string is kept verbatim as advisory data. Rows are never
/// updated or deleted — the ledger is the audit trail, and the match
/// aggregate is a materialized view over its score rows.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LedgerRecord {
    pub id: i64,
    pub match_id: i64,
    pub player_id: i64,
    pub team_id: i64,
    pub kind: EventKind,
    pub sub_type: CompactString,
    pub value: i32,
    pub quarter: i16,
    pub time_remaining: CompactString,
    pub event_time: CompactString,
    pub recorded_at: time::PrimitiveDateTime,
}

/// Data for appending a new ledger row.
#[derive(Debug, Clone)]
pub struct LedgerInsert {
    pub match_id: i64,
    pub player_id: i64,
    pub team_id: i64,
    pub kind: EventKind,
    pub sub_type: CompactString,
    pub value: i32,
    pub quarter: i16,
    pub time_remaining: CompactString,
    pub event_time: CompactString,
}

impl LedgerInsert {
    pub fn from_envelope(event: &EventEnvelope) -> Self {
        Self {
            match_id: event.match_id,
            player_id: event.player_id,
            team_id: event.team_id,
            kind: event.kind,
            sub_type: event.sub_type.clone(),
            value: event.value,
            quarter: event.quarter,
            time_remaining: event.time_remaining.clone(),
            event_time: event.event_time.clone(),
        }
    }

    /// Append the row inside the aggregation transaction. Returns the
    /// server-assigned id; `recorded_at` is stamped by the database.
    pub async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<i64, sqlx::Error> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO match_events \
             (match_id, player_id, team_id, kind, sub_type, value, quarter, time_remaining, event_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id",
        )
        .bind(self.match_id)
        .bind(self.player_id)
        .bind(self.team_id)
        .bind(self.kind)
        .bind(self.sub_type.as_str())
        .bind(self.value)
        .bind(self.quarter)
        .bind(self.time_remaining.as_str())
        .bind(self.event_time.as_str())
        .fetch_one(&mut **tx)
        .await?;
        Ok(id)
    }
}

/// Recent ledger rows for a match, newest first.
#[derive(Debug, Clone)]
pub struct ListLedgerRecords {
    pub match_id: i64,
    pub limit: i64,
}

impl Processor<ListLedgerRecords> for DatabaseProcessor {
    type Output = Vec<LedgerRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListLedgerRecords")]
    async fn process(&self, query: ListLedgerRecords) -> Result<Vec<LedgerRecord>, sqlx::Error> {
        sqlx::query_as::<_, LedgerRecord>(
            "SELECT id, match_id, player_id, team_id, kind, sub_type, value, quarter, \
             time_remaining, event_time, recorded_at \
             FROM match_events \
             WHERE match_id = $1 \
             ORDER BY id DESC \
             LIMIT $2",
        )
        .bind(query.match_id)
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await
    }
}
