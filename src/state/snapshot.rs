//! What the presentation layer renders

use serde::{Deserialize, Serialize};

use super::{TimerState, VisibilityState};

/// Published view of the stopwatch: rendered time fields plus the visibility flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub minutes: String,
    pub seconds: String,
    pub centiseconds: String,
    /// `MM:SS:CC`
    pub formatted: String,
    pub elapsed_ms: u64,
    pub running: bool,
    pub visible: bool,
}

impl DisplaySnapshot {
    pub fn capture(timer: &TimerState, visibility: &VisibilityState) -> Self {
        let display = timer.display();
        let formatted = display.to_string();

        Self {
            minutes: display.minutes,
            seconds: display.seconds,
            centiseconds: display.centiseconds,
            formatted,
            elapsed_ms: timer.elapsed_ms,
            running: timer.running,
            visible: visibility.is_visible(),
        }
    }
}

impl Default for DisplaySnapshot {
    fn default() -> Self {
        Self::capture(&TimerState::new(), &VisibilityState::new())
    }
}

/// A key-press forwarded from the page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyPress {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub code: String,
}

impl KeyPress {
    pub fn new(key: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            code: code.into(),
        }
    }

    /// Space toggles the stopwatch
    pub fn is_space(&self) -> bool {
        self.key == " " || self.code == "Space"
    }
}
