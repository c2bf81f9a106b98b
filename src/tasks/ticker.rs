//! Elapsed-time ticker task

use std::{sync::Weak, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error};

use crate::state::AppState;

/// Periodically recompute the elapsed time until the stopwatch stops or this ticker goes stale.
///
/// Missed ticks are skipped rather than replayed; each tick reads the clock,
/// so a late tick still shows the true elapsed time.
pub async fn ticker_task(state: Weak<AppState>, generation: u64, period: Duration) {
    debug!("Ticker {} started with period {:?}", generation, period);

    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        let Some(app) = state.upgrade() else {
            break;
        };

        match app.tick(generation) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                error!("Ticker failed to update stopwatch: {}", e);
                break;
            }
        }
    }

    debug!("Ticker {} finished", generation);
}
