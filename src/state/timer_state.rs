//! Timer state structure and management

use serde::{Deserialize, Serialize};

use super::DisplayTime;

/// Elapsed-time bookkeeping for the stopwatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    /// Accumulated running time, frozen while stopped
    pub elapsed_ms: u64,
    pub running: bool,
    /// Clock reading at the last resume, only meaningful while running
    pub start_epoch: i64,
}

impl TimerState {
    /// Create a stopped timer at zero
    pub fn new() -> Self {
        Self {
            elapsed_ms: 0,
            running: false,
            start_epoch: 0,
        }
    }

    /// Start or resume at `now_ms`. Returns false if already running.
    ///
    /// The start epoch is shifted back by the time already accumulated so
    /// that a resumed timer continues where it was paused.
    pub fn start(&mut self, now_ms: i64) -> bool {
        if self.running {
            return false;
        }

        self.start_epoch = now_ms - self.elapsed_ms as i64;
        self.running = true;
        true
    }

    /// Take a final reading at `now_ms` and freeze. Returns false if already stopped.
    pub fn stop(&mut self, now_ms: i64) -> bool {
        if !self.running {
            return false;
        }

        self.recompute(now_ms);
        self.running = false;
        true
    }

    /// Stop without taking a final reading
    pub fn halt(&mut self) {
        self.running = false;
    }

    /// Zero the timer and leave it stopped
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Recompute elapsed time from the wall clock while running.
    ///
    /// Never moves backwards, so a clock reading behind the last one leaves
    /// the elapsed time untouched.
    pub fn recompute(&mut self, now_ms: i64) -> u64 {
        if self.running {
            let measured = now_ms.saturating_sub(self.start_epoch).max(0) as u64;
            self.elapsed_ms = self.elapsed_ms.max(measured);
        }
        self.elapsed_ms
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn display(&self) -> DisplayTime {
        DisplayTime::from_elapsed(self.elapsed_ms)
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}
