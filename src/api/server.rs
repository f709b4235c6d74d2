//! API Server

use super::{
    handlers::AppState,
    middleware::{create_cors_layer, request_id_middleware},
    routes::create_router,
};
use crate::{
    config::{AppConfig, ServerConfig},
    errors::BingoResult,
    games::{SystemClock, TimestampCodeGenerator, TokioTimer},
    sink::HttpEventSink,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

/// `{"codigo":"123refd","start_in":2,"intervalo":12}`, URL-encoded
const EXAMPLE_START_PARAMS: &str =
    "%7B%22codigo%22%3A%22123refd%22%2C%22start_in%22%3A2%2C%22intervalo%22%3A12%7D";

/// Bingo HTTP server
pub struct ApiServer {
    config: AppConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Server with the production collaborators: HTTP sink, system clock,
    /// tokio timer and timestamp codes
    pub fn new(config: AppConfig) -> BingoResult<Self> {
        let clock = Arc::new(SystemClock);
        let state = Arc::new(AppState {
            sink_config: config.sink.clone(),
            timing: config.timing.clone(),
            sink: Arc::new(HttpEventSink::new(config.sink.request_timeout())?),
            clock: clock.clone(),
            timer: Arc::new(TokioTimer),
            codes: Arc::new(TimestampCodeGenerator::new(clock)),
        });
        Ok(Self::with_state(config, state))
    }

    pub fn with_state(config: AppConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Start the API server
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "bingo_draw=info,tower_http=info".into()),
            )
            .init();

        let app = build_app(self.state.clone(), &self.config.server);
        let addr = self.get_socket_addr()?;

        info!("🎱 Starting Bingo Draw Server");
        info!("   Listen: http://{}", addr);
        self.log_server_info();

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("✅ Bingo server running");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("🛑 Bingo server stopped gracefully");
        Ok(())
    }

    fn get_socket_addr(&self) -> Result<SocketAddr, Box<dyn std::error::Error>> {
        Ok(SocketAddr::from((
            self.config.server.host.parse::<std::net::IpAddr>()?,
            self.config.server.port,
        )))
    }

    fn log_server_info(&self) {
        let sink = &self.config.sink;
        info!("📋 Server Configuration:");
        info!("   Sink endpoint: {}", sink.url);
        info!("   Sink channel: {}", sink.channel);
        info!("   Sink token configured: {}", if sink.token.is_empty() { "no" } else { "yes" });
        info!("   Countdown tick: {}s", self.config.timing.countdown_tick_secs);
        info!("   CORS: {:?}", self.config.server.allowed_origins);

        info!("📊 Available endpoints:");
        info!("   GET  /                     - Service banner");
        info!("   GET  /health               - Health check");
        info!("   GET  /start_bingo/:params  - Start a game (URL-encoded JSON)");
        info!("   POST /start_bingo          - Start a game (JSON body)");
        info!(
            "   Example: http://localhost:{}/start_bingo/{}",
            self.config.server.port, EXAMPLE_START_PARAMS
        );
    }
}

/// Router with the middleware stack applied
pub fn build_app(state: Arc<AppState>, server: &ServerConfig) -> axum::Router {
    create_router(state)
        // Request ID middleware (first for tracing)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(create_cors_layer(server.allowed_origins.clone()))
        .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// Games run as detached tasks and stop with the process; in-flight draws
/// are not drained.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Ctrl+C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("SIGTERM handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let reason = tokio::select! {
        _ = ctrl_c => "Ctrl+C",
        _ = terminate => "SIGTERM",
    };
    info!("Received {}, shutting down; running games stop with the process", reason);
}
