//! Background tasks module
//!
//! The two scheduled tasks a running stopwatch owns.

pub mod idle_hide;
pub mod ticker;

// Re-export main functions
pub use idle_hide::idle_hide_task;
pub use ticker::ticker_task;
