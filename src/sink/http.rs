use super::{EventSink, SinkEnvelope};
use crate::errors::SinkError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Posts envelopes as JSON over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpEventSink {
    client: reqwest::Client,
}

impl HttpEventSink {
    /// Client with a whole-request deadline of `request_timeout`, on top of
    /// reqwest's own connect behaviour. An expired deadline surfaces as
    /// [`SinkError::Transport`].
    pub fn new(request_timeout: Duration) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| SinkError::Unavailable(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Sink over a preconfigured client, e.g. one with proxies or extra roots
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventSink for HttpEventSink {
    async fn deliver(&self, endpoint: &str, envelope: &SinkEnvelope) -> Result<(), SinkError> {
        let response = self
            .client
            .post(endpoint)
            .json(envelope)
            .send()
            .await
            .map_err(|e| SinkError::Transport {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        debug!("Sink accepted message for event {} ({})", envelope.event, status);
        Ok(())
    }
}
