//! Time source for the stopwatch

use std::fmt::Debug;

use chrono::Utc;
use tokio::time::Instant;

/// Something that can tell the current time in milliseconds
pub trait Clock: Debug + Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall-clock milliseconds anchored to a tokio `Instant`.
///
/// The epoch is read once from `chrono` and every later reading adds the
/// monotonic time since then, so readings never jump backwards and follow
/// tokio's paused clock in tests.
#[derive(Debug, Clone)]
pub struct SystemClock {
    anchor_epoch_ms: i64,
    anchor: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            anchor_epoch_ms: Utc::now().timestamp_millis(),
            anchor: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        let since_anchor = self.anchor.elapsed().as_millis() as i64;
        self.anchor_epoch_ms + since_anchor
    }
}
