//! Entry point for the orchestrator process.

mod bootstrap;
mod error;
mod queue;

use subcast_telemetry::{LoggingConfig, init_logging};
use tracing::error;

#[tokio::main]
async fn main() {
    let _ = init_logging(&LoggingConfig::default());

    if let Err(err) = bootstrap::run_app().await {
        error!(error = %err, "orchestrator exited with an error");
        std::process::exit(1);
    }
}
