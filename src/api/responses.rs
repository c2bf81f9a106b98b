//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::DisplaySnapshot;

/// API response structure for stopwatch action endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub display: DisplaySnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, display: DisplaySnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            display,
        }
    }

    /// Status follows whether the stopwatch is running after the action
    pub fn from_display(message: String, display: DisplaySnapshot) -> Self {
        let status = if display.running { "running" } else { "stopped" };
        Self::new(status.to_string(), message, display)
    }
}

/// Status response with display, configuration and server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub title: String,
    pub display: DisplaySnapshot,
    pub idle_deadline: Option<i64>,
    pub tick_ms: u64,
    pub idle_ms: u64,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
