//! Shared SIGTERM/SIGINT future for graceful shutdown across every binary.

use tracing::info;

/// Resolves once the process receives SIGINT or (on Unix) SIGTERM.
///
/// Intended for use with `axum::serve(..).with_graceful_shutdown(..)` or as
/// one arm of a `tokio::select!` around a worker's consume loop.
pub async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        let mut signal = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        signal.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
