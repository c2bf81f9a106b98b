//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

/// Default ticker cadence in milliseconds
pub const DEFAULT_TICK_MS: u64 = 10;
/// Default idle period before the display hides, in milliseconds
pub const DEFAULT_IDLE_MS: u64 = 2000;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "stopwatch-server")]
#[command(about = "A stopwatch widget backend with an auto-hiding display")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Interval between elapsed-time recomputations in milliseconds
    #[arg(long, default_value_t = DEFAULT_TICK_MS, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Milliseconds without pointer activity before the running display hides
    #[arg(long, default_value_t = DEFAULT_IDLE_MS, value_parser = clap::value_parser!(u64).range(1..))]
    pub idle_ms: u64,

    /// Title shown above the display
    #[arg(long, default_value = "STOPWATCH")]
    pub title: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn timing(&self) -> Timing {
        Timing {
            tick: Duration::from_millis(self.tick_ms),
            idle_hide: Duration::from_millis(self.idle_ms),
        }
    }
}

/// The two stopwatch timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Period of the elapsed-time ticker
    pub tick: Duration,
    /// One-shot delay before an idle display hides
    pub idle_hide: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            idle_hide: Duration::from_millis(DEFAULT_IDLE_MS),
        }
    }
}
