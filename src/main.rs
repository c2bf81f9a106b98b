//! Stopwatch Server - a stopwatch widget backend with an auto-hiding display
//!
//! This is the main entry point for the stopwatch-server application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use stopwatch_server::{
    api::create_router,
    config::Config,
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("stopwatch_server={},tower_http=info", config.log_level()))
        .init();

    info!("Starting stopwatch-server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tick={}ms, idle={}ms",
          config.host, config.port, config.tick_ms, config.idle_ms);

    // Mount the stopwatch component
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.title.clone(),
        config.timing(),
    ));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /toggle   - Start/stop the stopwatch");
    info!("  POST /start    - Start or resume");
    info!("  POST /stop     - Stop and freeze the time");
    info!("  POST /reset    - Reset to 00:00:00");
    info!("  POST /activity - Pointer activity, keeps the display visible");
    info!("  POST /key      - Key press, space toggles");
    info!("  GET  /display  - Current display");
    info!("  GET  /events   - Display updates as server-sent events");
    info!("  GET  /status   - Status and metadata");
    info!("  GET  /health   - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        result = shutdown_signal() => {
            match result {
                Ok(_) => info!("Shutdown signal received"),
                Err(e) => error!("Signal handling failed: {}", e),
            }
        }
    }

    // Unmount: cancel the ticker and idle-hide timer
    if let Err(e) = state.teardown() {
        error!("Failed to tear down stopwatch: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
