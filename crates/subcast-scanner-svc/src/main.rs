//! Entry point for the scanner process.

mod bootstrap;
mod error;
mod fetcher;
mod submit;
mod webhook_listener;

use subcast_telemetry::{LoggingConfig, init_logging};
use tracing::error;

#[tokio::main]
async fn main() {
    let _ = init_logging(&LoggingConfig::default());

    if let Err(err) = bootstrap::run_app().await {
        error!(error = %err, "scanner exited with an error");
        std::process::exit(1);
    }
}
