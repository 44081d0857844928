//! In-process partitioned event queue.
//!
//! Presents the broker contract the pipeline is written against: keyed
//! send, per-partition ordered receive with delivery offsets, and offset
//! commit. Routing hashes the key modulo the partition count, so all
//! messages sharing a key are delivered in send order by the single
//! consumer of their partition, while messages with different keys
//! interleave arbitrarily. Each partition is a bounded mpsc channel;
//! producers wait when a partition's buffer is full.

use std::sync::Arc;

use bytes::Bytes;
use compact_str::CompactString;
use thiserror::Error;
use tokio::sync::mpsc;

/// Default per-partition channel capacity.
pub const DEFAULT_PARTITION_BUFFER: usize = 256;

#[derive(Debug, Clone)]
struct QueueRecord {
    key: CompactString,
    payload: Bytes,
}

/// A record handed to a consumer, stamped with its partition and offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredRecord {
    pub partition: u32,
    pub offset: u64,
    pub key: CompactString,
    pub payload: Bytes,
}

#[derive(Debug, Error)]
pub enum SendError {
    /// The partition's consumer is gone; the queue no longer accepts
    /// messages for this key.
    #[error("partition {0} is closed")]
    PartitionClosed(u32),
}

/// Cloneable producer handle. Routes by key hash and awaits capacity.
#[derive(Clone)]
pub struct EventProducer {
    partitions: Arc<[mpsc::Sender<QueueRecord>]>,
}

impl EventProducer {
    pub fn partition_count(&self) -> u32 {
        self.partitions.len() as u32
    }

    /// The partition all messages with `key` are routed to.
    pub fn partition_for(&self, key: &str) -> u32 {
        fnv1a(key.as_bytes()) % self.partition_count()
    }

    pub async fn send(&self, key: &str, payload: Bytes) -> Result<(), SendError> {
        let partition = self.partition_for(key);
        let record = QueueRecord {
            key: CompactString::from(key),
            payload,
        };
        self.partitions[partition as usize]
            .send(record)
            .await
            .map_err(|_| SendError::PartitionClosed(partition))
    }
}

// FNV-1a (32-bit). Stable across processes, so a key's partition is
// reproducible for any fixed partition count.
fn fnv1a(data: &[u8]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for &byte in data {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// Single-consumer handle for one partition.
///
/// Offsets are stamped in delivery order starting at 0. `commit` records
/// the at-least-once watermark after a record has been handled.
pub struct PartitionConsumer {
    partition: u32,
    rx: mpsc::Receiver<QueueRecord>,
    next_offset: u64,
    committed: Option<u64>,
}

impl PartitionConsumer {
    pub fn partition(&self) -> u32 {
        self.partition
    }

    /// Next record in arrival order, or `None` once every producer handle
    /// is gone and the buffer is drained.
    pub async fn recv(&mut self) -> Option<DeliveredRecord> {
        let record = self.rx.recv().await?;
        let offset = self.next_offset;
        self.next_offset += 1;
        Some(DeliveredRecord {
            partition: self.partition,
            offset,
            key: record.key,
            payload: record.payload,
        })
    }

    /// Mark `offset` (and everything before it) as processed.
    pub fn commit(&mut self, offset: u64) {
        self.committed = Some(self.committed.map_or(offset, |current| current.max(offset)));
    }

    /// Highest committed offset, if any record was committed yet.
    pub fn committed(&self) -> Option<u64> {
        self.committed
    }
}

/// Build a queue with `partitions` partitions of `buffer` capacity each.
/// Returns one cloneable producer handle and one consumer per partition.
/// A partition count of zero is treated as one.
pub fn partitioned_queue(partitions: u32, buffer: usize) -> (EventProducer, Vec<PartitionConsumer>) {
    let partitions = partitions.max(1);
    let buffer = buffer.max(1);
    let mut senders = Vec::with_capacity(partitions as usize);
    let mut consumers = Vec::with_capacity(partitions as usize);
    for partition in 0..partitions {
        let (tx, rx) = mpsc::channel(buffer);
        senders.push(tx);
        consumers.push(PartitionConsumer {
            partition,
            rx,
            next_offset: 0,
            committed: None,
        });
    }
    (
        EventProducer {
            partitions: senders.into(),
        },
        consumers,
    )
}
