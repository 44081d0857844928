//! End-to-end properties of the publish -> queue -> consume pipeline,
//! exercised without a database through stub appliers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use courtside_core::aggregator::AggregateError;
use courtside_core::codec::EventEnvelope;
use courtside_core::consumer::{ConsumerLoop, EventApplier};
use courtside_core::publisher::EventPublisher;
use courtside_core::queue::partitioned_queue;
use courtside_sdk::objects::{EventKind, RecordEventRequest};
use tokio::sync::watch;

/// Records every applied envelope; optionally fails for one match id.
struct RecordingApplier {
    applied: Mutex<Vec<EventEnvelope>>,
    fail_for_match: Option<i64>,
}

impl RecordingApplier {
    fn new() -> Self {
        Self {
            applied: Mutex::new(Vec::new()),
            fail_for_match: None,
        }
    }

    fn failing_for(match_id: i64) -> Self {
        Self {
            applied: Mutex::new(Vec::new()),
            fail_for_match: Some(match_id),
        }
    }

    fn applied(&self) -> Vec<EventEnvelope> {
        self.applied.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventApplier for RecordingApplier {
    async fn apply(&self, event: EventEnvelope) -> Result<(), AggregateError> {
        if self.fail_for_match == Some(event.match_id) {
            return Err(AggregateError::MatchNotFound(event.match_id));
        }
        self.applied.lock().unwrap().push(event);
        Ok(())
    }
}

/// Sums score values per match, like the real aggregator's increment.
struct SummingApplier {
    totals: Mutex<HashMap<i64, i64>>,
}

#[async_trait]
impl EventApplier for SummingApplier {
    async fn apply(&self, event: EventEnvelope) -> Result<(), AggregateError> {
        *self.totals.lock().unwrap().entry(event.match_id).or_insert(0) +=
            i64::from(event.value);
        Ok(())
    }
}

fn request(match_id: i64, seq: i64, value: i32) -> RecordEventRequest {
    RecordEventRequest {
        match_id,
        // The sequence rides in player_id so tests can assert order.
        player_id: seq,
        team_id: 7,
        kind: EventKind::Score,
        sub_type: "layup".into(),
        value,
        quarter: 1,
        time_remaining: "10:23".into(),
        event_time: "".into(),
    }
}

fn spawn_loops<A: EventApplier + 'static>(
    applier: &Arc<A>,
    consumers: Vec<courtside_core::queue::PartitionConsumer>,
    shutdown_rx: &watch::Receiver<bool>,
) -> Vec<tokio::task::JoinHandle<()>> {
    consumers
        .into_iter()
        .map(|consumer| {
            let consumer_loop =
                ConsumerLoop::new(applier.clone(), consumer, shutdown_rx.clone());
            tokio::spawn(consumer_loop.run())
        })
        .collect()
}

#[tokio::test]
async fn per_match_delivery_order_is_preserved() {
    let (producer, consumers) = partitioned_queue(4, 32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let applier = Arc::new(RecordingApplier::new());
    let handles = spawn_loops(&applier, consumers, &shutdown_rx);

    let publisher = Arc::new(EventPublisher::new(producer));
    let mut publish_tasks = Vec::new();
    for match_id in [42i64, 77, 101] {
        let publisher = publisher.clone();
        publish_tasks.push(tokio::spawn(async move {
            for seq in 1..=20i64 {
                publisher.publish(request(match_id, seq, 2)).await.unwrap();
            }
        }));
    }
    for task in publish_tasks {
        task.await.unwrap();
    }

    // Closing the producer drains the partitions and ends the loops.
    drop(publisher);
    for handle in handles {
        handle.await.unwrap();
    }
    drop(shutdown_tx);

    let applied = applier.applied();
    assert_eq!(applied.len(), 60);
    for match_id in [42i64, 77, 101] {
        let sequence: Vec<i64> = applied
            .iter()
            .filter(|event| event.match_id == match_id)
            .map(|event| event.player_id)
            .collect();
        assert_eq!(sequence, (1..=20).collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn decode_failure_skips_only_that_message() {
    let (producer, consumers) = partitioned_queue(1, 16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let applier = Arc::new(RecordingApplier::new());
    let handles = spawn_loops(&applier, consumers, &shutdown_rx);

    let raw_producer = producer.clone();
    let publisher = EventPublisher::new(producer);

    publisher.publish(request(42, 1, 2)).await.unwrap();
    raw_producer
        .send("42", Bytes::from_static(b"definitely not json"))
        .await
        .unwrap();
    publisher.publish(request(42, 2, 3)).await.unwrap();

    drop(publisher);
    drop(raw_producer);
    for handle in handles {
        handle.await.unwrap();
    }
    drop(shutdown_tx);

    let sequence: Vec<i64> = applier.applied().iter().map(|e| e.player_id).collect();
    assert_eq!(sequence, vec![1, 2]);
}

#[tokio::test]
async fn applier_failure_does_not_stop_the_loop() {
    let (producer, consumers) = partitioned_queue(1, 16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let applier = Arc::new(RecordingApplier::failing_for(999));
    let handles = spawn_loops(&applier, consumers, &shutdown_rx);

    let publisher = EventPublisher::new(producer);
    publisher.publish(request(999, 1, 2)).await.unwrap();
    publisher.publish(request(42, 2, 3)).await.unwrap();

    drop(publisher);
    for handle in handles {
        handle.await.unwrap();
    }
    drop(shutdown_tx);

    let applied = applier.applied();
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].match_id, 42);
}

#[tokio::test]
async fn concurrent_publishers_lose_no_score() {
    let (producer, consumers) = partitioned_queue(4, 32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let applier = Arc::new(SummingApplier {
        totals: Mutex::new(HashMap::new()),
    });
    let handles = spawn_loops(&applier, consumers, &shutdown_rx);

    let publisher = Arc::new(EventPublisher::new(producer));
    let mut publish_tasks = Vec::new();
    for match_id in 1..=8i64 {
        let publisher = publisher.clone();
        publish_tasks.push(tokio::spawn(async move {
            for seq in 1..=25i64 {
                publisher.publish(request(match_id, seq, 3)).await.unwrap();
            }
        }));
    }
    for task in publish_tasks {
        task.await.unwrap();
    }

    drop(publisher);
    for handle in handles {
        handle.await.unwrap();
    }
    drop(shutdown_tx);

    let totals = applier.totals.lock().unwrap();
    for match_id in 1..=8i64 {
        assert_eq!(totals[&match_id], 75, "match {match_id} lost score events");
    }
}

#[tokio::test]
async fn shutdown_signal_stops_the_loops() {
    let (producer, consumers) = partitioned_queue(2, 16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let applier = Arc::new(RecordingApplier::new());
    let handles = spawn_loops(&applier, consumers, &shutdown_rx);

    let publisher = EventPublisher::new(producer);
    publisher.publish(request(42, 1, 2)).await.unwrap();

    // Give the loops a chance to drain, then signal shutdown while the
    // producer is still alive.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    shutdown_tx.send(true).unwrap();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(applier.applied().len(), 1);
}
