//! Scanner startup: spawn the filesystem watch, WebSocket, and periodic
//! resync intake tasks alongside the webhook listener, all feeding one
//! shared channel that gets drained into orchestrator submissions.

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::Client;
use subcast_config::AppConfig;
use subcast_scanner::{ScanTrigger, build_submit_request};
use subcast_telemetry::Metrics;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};
use crate::fetcher::HttpItemDetailsFetcher;
use crate::webhook_listener::{WebhookState, router};

struct BootstrapDependencies {
    config: AppConfig,
    client: Client,
    metrics: Metrics,
}

impl BootstrapDependencies {
    fn from_env() -> AppResult<Self> {
        let config = AppConfig::from_env().map_err(|err| AppError::config("load_config", err))?;
        let client = Client::builder()
            .build()
            .map_err(AppError::http_client)?;
        let metrics = Metrics::new().map_err(|err| AppError::telemetry("build_registry", err))?;

        Ok(Self { config, client, metrics })
    }
}

pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    run_app_with(dependencies).await
}

async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    let BootstrapDependencies { config, client, metrics } = dependencies;

    let target_language = config
        .languages
        .target_default
        .clone()
        .unwrap_or_else(|| config.languages.fallback.clone());

    let roots: Vec<PathBuf> = config
        .scanner
        .watch_dirs
        .iter()
        .map(PathBuf::from)
        .collect();

    let (sender, mut receiver) = mpsc::unbounded_channel::<ScanTrigger>();

    if !roots.is_empty() {
        let watch_sender = sender.clone();
        let watch_roots = roots.clone();
        let watch_extensions = config.scanner.media_extensions.clone();
        let debounce = config.scanner.debounce;
        tokio::spawn(async move {
            if let Err(err) = subcast_scanner::watcher::run(watch_roots, watch_extensions, debounce, watch_sender).await {
                error!(error = %err, "filesystem watcher exited");
            }
        });

        let resync_sender = sender.clone();
        let resync_roots = roots;
        let resync_extensions = config.scanner.media_extensions.clone();
        let resync_interval = config.scanner.fallback_sync_interval;
        tokio::spawn(async move {
            subcast_scanner::resync::run(resync_roots, resync_extensions, resync_interval, resync_sender).await;
        });
    } else {
        warn!("no watch directories configured, filesystem watch and fallback resync are disabled");
    }

    if let (Some(media_server_url), Some(media_server_api_key)) = (
        config.scanner.media_server_url.clone(),
        config.scanner.media_server_api_key.clone(),
    ) {
        let ws_sender = sender.clone();
        let ws_client = client.clone();
        let reconnect_base = config.scanner.ws_reconnect_delay;
        let reconnect_cap = config.scanner.ws_max_reconnect_delay;
        let ws_url = media_server_url.clone();
        let ws_api_key = media_server_api_key.clone();
        tokio::spawn(async move {
            let fetcher = HttpItemDetailsFetcher::new(ws_client, ws_url.clone(), ws_api_key.clone());
            if let Err(err) = subcast_scanner::ws::run(&ws_url, &ws_api_key, &fetcher, reconnect_base, reconnect_cap, ws_sender).await {
                error!(error = %err, "websocket intake exited");
            }
        });
    } else {
        info!("media server url/api key not configured, websocket intake is disabled");
    }

    drop(sender);

    let webhook_state = WebhookState {
        client: client.clone(),
        orchestrator_url: Arc::new(config.api.orchestrator_url.clone()),
        target_language: Arc::new(target_language.clone()),
    };
    let app = router(webhook_state, metrics);
    let bind_addr = config.api.scanner_bind_addr.clone();

    let drain_client = client;
    let drain_orchestrator_url = config.api.orchestrator_url;
    let drain_target_language = target_language;
    let drain_task = tokio::spawn(async move {
        while let Some(trigger) = receiver.recv().await {
            let Some(request) = build_submit_request(&trigger, &drain_target_language) else {
                continue;
            };
            crate::submit::submit_download(&drain_client, &drain_orchestrator_url, request).await;
        }
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::invalid_config("SCANNER_BIND_ADDR", err.to_string()))?;
    info!(addr = %bind_addr, "scanner webhook listener bound");

    axum::serve(listener, app)
        .with_graceful_shutdown(subcast_telemetry::wait_for_shutdown_signal())
        .await
        .map_err(|err| AppError::webhook(anyhow::Error::new(err)))?;

    drain_task.abort();
    Ok(())
}
