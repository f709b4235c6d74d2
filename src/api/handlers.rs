//! Request Handlers
//!
//! Start requests are acknowledged immediately; the game itself runs in a
//! background task that owns its scheduler.

use super::{
    errors::ApiError,
    middleware::RequestId,
    models::*,
};
use crate::{
    config::{SinkConfig, TimingConfig},
    games::{
        Clock, CodeGenerator, DrawScheduler, GameConfig, GameParams, SequenceBuilder, Timer,
    },
    sink::EventSink,
};
use axum::{
    extract::{Path, State},
    http::Uri,
    Extension, Json,
};
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use tracing::{error, info};

/// Shared application state
pub struct AppState {
    pub sink_config: SinkConfig,
    pub timing: TimingConfig,
    pub sink: Arc<dyn EventSink>,
    pub clock: Arc<dyn Clock>,
    pub timer: Arc<dyn Timer>,
    pub codes: Arc<dyn CodeGenerator>,
}

/// Service banner
/// GET /
pub async fn root_handler(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok".to_string(),
        message: "Bingo server running".to_string(),
        sink: SinkInfo {
            url: state.sink_config.url.clone(),
            channel: state.sink_config.channel.clone(),
        },
    })
}

/// Health check handler
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Running".to_string(),
    })
}

/// Start a game from URL-encoded JSON in the path
/// GET /start_bingo/{params}
pub async fn start_from_path_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Json<StartResponse> {
    info!("[{}] Start request with parameters: {}", request_id.0, raw);
    Json(launch_game(&state, &request_id, GameParams::from_json(&raw)))
}

/// Start a game from a JSON request body
/// POST /start_bingo
pub async fn start_from_body_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    body: String,
) -> Json<StartResponse> {
    info!("[{}] Start request with body: {}", request_id.0, body);
    Json(launch_game(&state, &request_id, GameParams::from_json(&body)))
}

/// Structured 404 for unknown routes
pub async fn not_found_handler(request_id: Option<Extension<RequestId>>, uri: Uri) -> ApiError {
    let request_id = request_id.map(|Extension(id)| id.0).unwrap_or_default();
    ApiError::not_found(request_id, format!("No route for {}", uri.path()))
}

/// Resolve params, build the scheduler and spawn it
fn launch_game(state: &Arc<AppState>, request_id: &RequestId, params: GameParams) -> StartResponse {
    let config = GameConfig::from_params(&params, state.codes.as_ref());
    let sequence =
        SequenceBuilder::new(StdRng::from_entropy()).build(config.custom_sequence.as_deref());

    let ack = AckParams {
        code: config.code.clone(),
        start_in: config.start_in_minutes,
        intervalo: config.interval_secs,
        custom_sequence: config.custom_sequence.is_some(),
    };

    let mut scheduler = DrawScheduler::new(
        config,
        sequence,
        state.sink_config.clone(),
        &state.timing,
    );
    let state = Arc::clone(state);
    let request_id = request_id.0.clone();

    tokio::spawn(async move {
        match scheduler
            .start(state.timer.as_ref(), state.clock.as_ref(), state.sink.as_ref())
            .await
        {
            Ok(summary) => info!(
                "[{}] Game {} finished: {} numbers drawn",
                request_id, summary.code, summary.total_drawn
            ),
            Err(e) => error!("[{}] Game {} failed: {}", request_id, scheduler.config().code, e),
        }
    });

    StartResponse {
        status: "ok".to_string(),
        message: "Processing request".to_string(),
        params: ack,
    }
}
