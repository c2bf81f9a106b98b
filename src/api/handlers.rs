//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tracing::error;

use crate::state::{AppState, DisplaySnapshot, KeyOutcome, KeyPress};
use super::responses::{ApiResponse, HealthResponse, StatusResponse};

/// Wrap the outcome of a stopwatch action in an `ApiResponse`
fn action_response(
    action: &str,
    message: &str,
    result: Result<DisplaySnapshot, String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match result {
        Ok(display) => Ok(Json(ApiResponse::from_display(message.to_string(), display))),
        Err(e) => {
            error!("Failed to {} stopwatch: {}", action, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /toggle - Start/stop button
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    action_response("toggle", "Stopwatch toggled", state.toggle())
}

/// Handle POST /start - Start or resume timing
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    action_response("start", "Stopwatch started", state.start())
}

/// Handle POST /stop - Freeze the elapsed time
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    action_response("stop", "Stopwatch stopped", state.stop())
}

/// Handle POST /reset - Zero the stopwatch
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    action_response("reset", "Stopwatch reset", state.reset())
}

/// Handle POST /activity - Pointer moved on the page
pub async fn activity_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    action_response("record activity on", "Activity recorded", state.activity())
}

/// Handle POST /key - Key pressed anywhere on the page
pub async fn key_handler(
    State(state): State<Arc<AppState>>,
    Json(key): Json<KeyPress>,
) -> Result<Json<KeyOutcome>, StatusCode> {
    match state.key_press(&key) {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => {
            error!("Failed to handle key press: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /display - Current display snapshot
pub async fn display_handler(State(state): State<Arc<AppState>>) -> Result<Json<DisplaySnapshot>, StatusCode> {
    match state.snapshot() {
        Ok(display) => Ok(Json(display)),
        Err(e) => {
            error!("Failed to read display: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /events - Stream every published snapshot as a `display` event
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();

    let events = stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }

        let snapshot = rx.borrow_and_update().clone();
        let event = match Event::default().event("display").json_data(&snapshot) {
            Ok(event) => event,
            Err(e) => {
                error!("Failed to encode display event: {}", e);
                Event::default().comment("encode failed")
            }
        };

        Some((Ok(event), (rx, false)))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /status - Return current stopwatch status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let display = match state.snapshot() {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to read display: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let visibility = match state.get_visibility_state() {
        Ok(v) => v,
        Err(e) => {
            error!("Failed to get visibility state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        title: state.title.clone(),
        display,
        idle_deadline: visibility.idle_deadline,
        tick_ms: state.timing.tick.as_millis() as u64,
        idle_ms: state.timing.idle_hide.as_millis() as u64,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
