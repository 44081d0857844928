//! Wire codec for match event envelopes.
//!
//! The payload travelling between publisher and consumer is a JSON object
//! whose field names are fixed by the queue contract; the event kind is
//! carried under the wire name `type` as a small integer code. Encoding
//! and decoding are pure and stateless.

use crate::entities::EventKind;
use bytes::Bytes;
use compact_str::{CompactString, format_compact};
use serde::{Deserialize, Serialize};

/// A match event as it travels through the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub match_id: i64,
    pub player_id: i64,
    pub team_id: i64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub sub_type: CompactString,
    #[serde(default)]
    pub value: i32,
    #[serde(default = "default_quarter")]
    pub quarter: i16,
    #[serde(default)]
    pub time_remaining: CompactString,
    /// Advisory, client-supplied. The ledger stamps its own `recorded_at`.
    #[serde(default)]
    pub event_time: CompactString,
}

fn default_quarter() -> i16 {
    1
}

#[derive(Debug, thiserror::Error)]
#[error("failed to encode event envelope: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

#[derive(Debug, thiserror::Error)]
#[error("failed to decode event envelope: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

impl EventEnvelope {
    pub fn encode(&self) -> Result<Bytes, EncodeError> {
        let raw = serde_json::to_vec(self)?;
        Ok(Bytes::from(raw))
    }

    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(payload)?)
    }

    /// Queue partition key. All events of one match share it, which is
    /// what orders their delivery relative to each other.
    pub fn partition_key(&self) -> CompactString {
        format_compact!("{}", self.match_id)
    }
}
