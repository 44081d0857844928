//! Publish side of the ingestion pipeline.

use crate::codec::{EncodeError, EventEnvelope};
use crate::entities::EventKind;
use crate::queue::EventProducer;
use courtside_sdk::objects::RecordEventRequest;
use thiserror::Error;

/// Errors surfaced to the caller of `publish`.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Bad input; the caller's fault, never retried.
    #[error("invalid event: {0}")]
    Validation(&'static str),

    /// The queue rejected the send. Retry policy belongs to the caller,
    /// not to the publisher.
    #[error("event queue unavailable")]
    QueueUnavailable,

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Validates and publishes match events onto the partitioned queue.
///
/// The partition key is the decimal `match_id`: all events of one match
/// are delivered to the aggregator in publish order, while events of
/// different matches interleave arbitrarily. The publisher never touches
/// storage.
pub struct EventPublisher {
    producer: EventProducer,
}

impl EventPublisher {
    pub fn new(producer: EventProducer) -> Self {
        Self { producer }
    }

    pub async fn publish(&self, request: RecordEventRequest) -> Result<(), PublishError> {
        let envelope = envelope_from_request(request)?;
        let payload = envelope.encode()?;
        let key = envelope.partition_key();
        self.producer.send(&key, payload).await.map_err(|e| {
            tracing::error!(match_id = envelope.match_id, error = %e, "queue send failed");
            PublishError::QueueUnavailable
        })?;
        tracing::debug!(
            match_id = envelope.match_id,
            kind = ?envelope.kind,
            value = envelope.value,
            "event published"
        );
        Ok(())
    }
}

/// Check request invariants and build the wire envelope.
fn envelope_from_request(request: RecordEventRequest) -> Result<EventEnvelope, PublishError> {
    if request.match_id <= 0 {
        return Err(PublishError::Validation("match_id is required"));
    }
    if request.player_id <= 0 {
        return Err(PublishError::Validation("player_id is required"));
    }
    if request.team_id <= 0 {
        return Err(PublishError::Validation("team_id is required"));
    }
    if request.value < 0 {
        return Err(PublishError::Validation("value must be non-negative"));
    }
    Ok(EventEnvelope {
        match_id: request.match_id,
        player_id: request.player_id,
        team_id: request.team_id,
        kind: EventKind::from(request.kind),
        sub_type: request.sub_type,
        value: request.value,
        quarter: request.quarter,
        time_remaining: request.time_remaining,
        event_time: request.event_time,
    })
}
