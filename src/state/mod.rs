//! State management module
//!
//! This module contains the stopwatch state structures and the component that owns them.

pub mod app_state;
pub mod display_time;
pub mod snapshot;
pub mod timer_state;
pub mod visibility_state;

// Re-export main types
pub use app_state::{AppState, KeyOutcome};
pub use display_time::DisplayTime;
pub use snapshot::{DisplaySnapshot, KeyPress};
pub use timer_state::TimerState;
pub use visibility_state::VisibilityState;
