//! Idle-hide one-shot task

use std::{sync::Weak, time::Duration};
use tokio::time::sleep;
use tracing::error;

use crate::state::AppState;

/// Wait out the idle period, then ask the stopwatch to hide its display
pub async fn idle_hide_task(state: Weak<AppState>, generation: u64, delay: Duration) {
    sleep(delay).await;

    if let Some(app) = state.upgrade() {
        if let Err(e) = app.hide_if_idle(generation) {
            error!("Failed to hide idle display: {}", e);
        }
    }
}
