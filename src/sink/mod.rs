//! Outbound event sink
//!
//! Every countdown tick and every draw is relayed to an external messaging
//! endpoint as a JSON envelope whose `message` field is itself a JSON-encoded
//! payload string.

pub mod http;
pub mod memory;

pub use http::HttpEventSink;
pub use memory::MemorySink;

use crate::config::SinkConfig;
use crate::errors::{BingoResult, SinkError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Transport for sink envelopes
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one envelope to `endpoint`
    async fn deliver(&self, endpoint: &str, envelope: &SinkEnvelope) -> Result<(), SinkError>;
}

/// Wire envelope shared by all sink messages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SinkEnvelope {
    pub channel: String,
    pub token: String,
    /// Game code
    pub event: String,
    /// JSON-encoded [`EventPayload`]
    pub message: String,
}

impl SinkEnvelope {
    pub fn new(config: &SinkConfig, code: &str, payload: &EventPayload) -> BingoResult<Self> {
        Ok(Self {
            channel: config.channel.clone(),
            token: config.token.clone(),
            event: code.to_string(),
            message: serde_json::to_string(payload)?,
        })
    }

    /// Decode the inner payload
    pub fn payload(&self) -> BingoResult<EventPayload> {
        Ok(serde_json::from_str(&self.message)?)
    }
}

/// Inner payload of a sink message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum EventPayload {
    Draw(DrawPayload),
    Countdown(CountdownPayload),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CountdownPayload {
    pub remaining_minutes: u32,
    pub time_utc: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DrawPayload {
    /// Ball label, e.g. "B7"
    pub number: String,
    pub sequence_position: usize,
    pub time_utc: u64,
}

impl EventPayload {
    pub fn countdown(remaining_minutes: u32, time_utc: u64) -> Self {
        EventPayload::Countdown(CountdownPayload {
            remaining_minutes,
            time_utc,
        })
    }

    pub fn draw(label: &str, sequence_position: usize, time_utc: u64) -> Self {
        EventPayload::Draw(DrawPayload {
            number: label.to_string(),
            sequence_position,
            time_utc,
        })
    }
}
