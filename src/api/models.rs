//! API Response Models

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Service banner returned by `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub status: String,
    pub message: String,
    pub sink: SinkInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkInfo {
    pub url: String,
    pub channel: String,
}

/// Immediate acknowledgement of a start request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartResponse {
    pub status: String,
    pub message: String,
    pub params: AckParams,
}

/// Resolved game parameters echoed back to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckParams {
    pub code: String,
    pub start_in: u32,
    pub intervalo: u64,
    pub custom_sequence: bool,
}
