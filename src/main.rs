//! The main entry point for the log-router viewer.
use anyhow::Result;

/// Parses the command line, installs the router as the `tracing` sink and
/// runs the console until the user quits.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the terminal
/// cannot be driven.
#[tokio::main]
async fn main() -> Result<()> {
    log_router::app::launch().await
}
