//! Formatted stopwatch reading

use std::fmt;

use serde::{Deserialize, Serialize};

const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_SECOND: u64 = 1_000;
const MS_PER_CENTISECOND: u64 = 10;

/// Minutes, seconds and centiseconds of an elapsed time, each padded to two digits.
///
/// Minutes wrap at 60; there is no hour field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayTime {
    pub minutes: String,
    pub seconds: String,
    pub centiseconds: String,
}

impl DisplayTime {
    /// Truncate an elapsed time in milliseconds into its display fields
    pub fn from_elapsed(elapsed_ms: u64) -> Self {
        let minutes = (elapsed_ms / MS_PER_MINUTE) % 60;
        let seconds = (elapsed_ms / MS_PER_SECOND) % 60;
        let centiseconds = (elapsed_ms % MS_PER_SECOND) / MS_PER_CENTISECOND;

        Self {
            minutes: format!("{:02}", minutes),
            seconds: format!("{:02}", seconds),
            centiseconds: format!("{:02}", centiseconds),
        }
    }

    pub fn zero() -> Self {
        Self::from_elapsed(0)
    }
}

impl Default for DisplayTime {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for DisplayTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.minutes, self.seconds, self.centiseconds)
    }
}
