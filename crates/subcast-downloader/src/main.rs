//! Entry point for the downloader worker process.

mod bootstrap;
mod error;
mod pipeline;

use subcast_telemetry::{LoggingConfig, init_logging};
use tracing::error;

#[tokio::main]
async fn main() {
    let _ = init_logging(&LoggingConfig::default());

    if let Err(err) = bootstrap::run_app().await {
        error!(error = %err, "downloader exited with an error");
        std::process::exit(1);
    }
}
