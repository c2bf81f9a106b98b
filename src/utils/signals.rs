//! Signal handling for graceful shutdown

use std::io;

use signal_hook_tokio::Signals;
use futures::stream::StreamExt;
use tracing::info;

/// Wait for a shutdown signal (SIGTERM, SIGINT) and return its number
pub async fn shutdown_signal() -> io::Result<i32> {
    let mut signals = Signals::new([
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
    ])?;
    let handle = signals.handle();

    let received = signals.next().await;
    handle.close();

    match received {
        Some(signal) => {
            info!("Received signal: {}", signal);
            Ok(signal)
        }
        None => Err(io::Error::other("signal stream closed")),
    }
}
