//! Display visibility and idle deadline

use serde::{Deserialize, Serialize};

/// Whether the stopwatch display is shown, and when it will hide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityState {
    pub visible: bool,
    /// Clock reading after which an idle display hides, if armed
    pub idle_deadline: Option<i64>,
}

impl VisibilityState {
    /// Create a visible, unarmed state
    pub fn new() -> Self {
        Self {
            visible: true,
            idle_deadline: None,
        }
    }

    /// Show the display and push the idle deadline `delay_ms` past `now_ms`
    pub fn arm(&mut self, now_ms: i64, delay_ms: u64) {
        self.visible = true;
        self.idle_deadline = Some(now_ms.saturating_add(delay_ms as i64));
    }

    /// Show the display and drop any pending deadline
    pub fn reveal(&mut self) {
        self.visible = true;
        self.idle_deadline = None;
    }

    /// Hide the display once the idle period ran out
    pub fn hide(&mut self) {
        self.visible = false;
        self.idle_deadline = None;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Default for VisibilityState {
    fn default() -> Self {
        Self::new()
    }
}
