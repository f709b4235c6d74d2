use super::{EventPayload, EventSink, SinkEnvelope};
use crate::errors::SinkError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// A delivery attempt seen by [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDelivery {
    pub endpoint: String,
    pub envelope: SinkEnvelope,
    pub delivered: bool,
}

#[derive(Debug, Default)]
struct MemorySinkState {
    deliveries: Vec<RecordedDelivery>,
    fail_all: bool,
    fail_attempts: HashSet<usize>,
}

/// In-process sink that records every attempt.
///
/// Failures can be injected for all attempts or for specific 0-based
/// attempt indices; failed attempts are still recorded.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    state: Arc<Mutex<MemorySinkState>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that rejects every delivery
    pub fn failing() -> Self {
        let sink = Self::new();
        sink.with_state(|state| state.fail_all = true);
        sink
    }

    /// Reject the given attempt indices
    pub fn fail_attempts(&self, attempts: impl IntoIterator<Item = usize>) {
        self.with_state(|state| state.fail_attempts.extend(attempts));
    }

    pub fn deliveries(&self) -> Vec<RecordedDelivery> {
        self.with_state(|state| state.deliveries.clone())
    }

    /// Envelopes that were accepted
    pub fn envelopes(&self) -> Vec<SinkEnvelope> {
        self.with_state(|state| {
            state
                .deliveries
                .iter()
                .filter(|d| d.delivered)
                .map(|d| d.envelope.clone())
                .collect()
        })
    }

    /// Decoded payloads of every attempt, accepted or not
    pub fn attempted_payloads(&self) -> Vec<EventPayload> {
        self.deliveries()
            .iter()
            .filter_map(|d| d.envelope.payload().ok())
            .collect()
    }

    pub fn attempt_count(&self) -> usize {
        self.with_state(|state| state.deliveries.len())
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MemorySinkState) -> T) -> T {
        match self.state.lock() {
            Ok(mut state) => f(&mut state),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

#[async_trait]
impl EventSink for MemorySink {
    async fn deliver(&self, endpoint: &str, envelope: &SinkEnvelope) -> Result<(), SinkError> {
        self.with_state(|state| {
            let attempt = state.deliveries.len();
            let delivered = !state.fail_all && !state.fail_attempts.contains(&attempt);
            state.deliveries.push(RecordedDelivery {
                endpoint: endpoint.to_string(),
                envelope: envelope.clone(),
                delivered,
            });

            if delivered {
                Ok(())
            } else {
                Err(SinkError::Unavailable(format!("injected failure on attempt {}", attempt)))
            }
        })
    }
}
