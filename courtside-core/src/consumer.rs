//! Per-partition consumer loop.

use crate::aggregator::AggregateError;
use crate::codec::EventEnvelope;
use crate::queue::{DeliveredRecord, PartitionConsumer};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Applies one decoded event to durable storage.
#[async_trait]
pub trait EventApplier: Send + Sync {
    async fn apply(&self, event: EventEnvelope) -> Result<(), AggregateError>;
}

/// Pulls one partition's records in order, decodes each, hands it to the
/// applier, and commits the offset.
///
/// Delivery is at-least-once with no replay on failure: the offset is
/// committed after every handling attempt, so an undecodable payload or a
/// failed apply drops that event's effect. The ledger and aggregate stay
/// mutually consistent on every drop path — only completeness is lost.
///
/// Loops run one per partition and share no mutable state; shutdown is
/// cooperative, letting an in-flight apply finish before the loop exits.
pub struct ConsumerLoop<A> {
    applier: Arc<A>,
    consumer: PartitionConsumer,
    shutdown_rx: watch::Receiver<bool>,
}

impl<A: EventApplier> ConsumerLoop<A> {
    pub fn new(
        applier: Arc<A>,
        consumer: PartitionConsumer,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            applier,
            consumer,
            shutdown_rx,
        }
    }

    /// Run until shutdown is signalled or the partition closes.
    pub async fn run(mut self) {
        let partition = self.consumer.partition();
        info!(partition, "consumer loop started");

        loop {
            tokio::select! {
                biased;

                changed = self.shutdown_rx.changed() => {
                    // A dropped shutdown sender counts as a signal.
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        info!(partition, "consumer loop received shutdown signal");
                        break;
                    }
                }

                maybe = self.consumer.recv() => {
                    match maybe {
                        Some(record) => {
                            let offset = record.offset;
                            self.handle(record).await;
                            self.consumer.commit(offset);
                        }
                        None => {
                            info!(partition, "partition closed");
                            break;
                        }
                    }
                }
            }
        }

        info!(partition, "consumer loop shutdown complete");
    }

    /// Decode and apply one record. Failures are logged and never
    /// retried or requeued: a malformed payload or a failed apply must
    /// not block the rest of the partition.
    async fn handle(&self, record: DeliveredRecord) {
        let envelope = match EventEnvelope::decode(&record.payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(
                    partition = record.partition,
                    offset = record.offset,
                    error = %e,
                    "skipping undecodable event payload"
                );
                return;
            }
        };

        if let Err(e) = self.applier.apply(envelope).await {
            error!(
                partition = record.partition,
                offset = record.offset,
                error = %e,
                "failed to apply event, dropping"
            );
        }
    }
}
