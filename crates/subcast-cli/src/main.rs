//! Entry point for the `subcast` operator CLI.

use subcast_telemetry::{LoggingConfig, init_logging};

#[tokio::main]
async fn main() {
    let _ = init_logging(&LoggingConfig::default());

    let exit_code = subcast_cli::run().await;
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}
