//! Stopwatch Server - the stateful core of a stopwatch widget
//!
//! This library keeps the stopwatch's elapsed-time bookkeeping and its
//! auto-hiding display state, and exposes both over HTTP to whatever page
//! renders them.

pub mod api;
pub mod clock;
pub mod config;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use clock::{Clock, SystemClock};
pub use config::{Config, Timing};
pub use state::{AppState, DisplaySnapshot, DisplayTime, KeyPress};
pub use utils::signals::shutdown_signal;
