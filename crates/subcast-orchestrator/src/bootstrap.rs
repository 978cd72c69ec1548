//! Orchestrator startup: load configuration, connect to the broker and
//! store, wire the HTTP API, and serve.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use subcast_api::{ApiServer, ApiState};
use subcast_broker::{AmqpEventBus, BrokerConnection};
use subcast_broker::topology::{DOWNLOAD_QUEUE, TRANSLATE_QUEUE, declare_work_queue};
use subcast_config::AppConfig;
use subcast_domain::JobId;
use subcast_store::{DedupStore, JobStore, RedisStore};
use subcast_telemetry::Metrics;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::queue::AmqpTaskQueue;

/// Everything the orchestrator needs before it can start serving requests.
pub(crate) struct BootstrapDependencies {
    config: AppConfig,
    broker: BrokerConnection,
    store: Arc<RedisStore>,
    metrics: Metrics,
}

impl BootstrapDependencies {
    /// Load configuration from the environment and establish the broker and
    /// store connections.
    pub(crate) async fn from_env() -> AppResult<Self> {
        let config = AppConfig::from_env().map_err(|err| AppError::config("load_config", err))?;

        let broker = BrokerConnection::connect(&config.infra.broker_url)
            .await
            .map_err(|err| AppError::broker("connect", err))?;

        let store = RedisStore::connect(&config.infra.store_url)
            .await
            .map_err(|err| AppError::store("connect", err))?;

        let metrics = Metrics::new().map_err(|err| AppError::telemetry("build_registry", err))?;

        Ok(Self {
            config,
            broker,
            store: Arc::new(store),
            metrics,
        })
    }
}

/// Load dependencies from the environment and run until the server stops.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env().await?;
    run_app_with(dependencies).await
}

pub(crate) async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    let BootstrapDependencies {
        config,
        broker,
        store,
        metrics,
    } = dependencies;

    let event_channel = broker
        .channel()
        .await
        .map_err(|err| AppError::broker("open_event_channel", err))?;
    let event_bus = Arc::new(
        AmqpEventBus::connect(event_channel, subcast_events::EXCHANGE_NAME)
            .await
            .map_err(|err| AppError::broker("connect_event_bus", err))?,
    );

    let task_channel = broker
        .channel()
        .await
        .map_err(|err| AppError::broker("open_task_channel", err))?;
    declare_work_queue(&task_channel, DOWNLOAD_QUEUE)
        .await
        .map_err(|err| AppError::broker("declare_download_queue", err))?;
    declare_work_queue(&task_channel, TRANSLATE_QUEUE)
        .await
        .map_err(|err| AppError::broker("declare_translate_queue", err))?;
    let task_queue = Arc::new(AmqpTaskQueue::new(task_channel));

    metrics.set_broker_connected(true);
    metrics.set_store_connected(true);

    let job_store: Arc<dyn JobStore> = store.clone();
    let dedup_store: Arc<dyn DedupStore> = store.clone();

    let state = Arc::new(ApiState::new(
        job_store,
        dedup_store,
        event_bus,
        task_queue,
        metrics.clone(),
    ));

    spawn_store_health_loop(store, metrics);

    let addr: SocketAddr = config
        .api
        .bind_addr
        .parse()
        .map_err(|err| AppError::invalid_config("API_BIND_ADDR", format!("{err}")))?;

    info!(%addr, "starting orchestrator");
    let server = ApiServer::new(state);
    server.serve(addr).await.map_err(AppError::api_server)
}

/// Periodically probe the store connection and keep the `/health` gauge
/// current; `RedisStore` reconnects transparently, so this surfaces sustained
/// outages rather than driving reconnection itself.
fn spawn_store_health_loop(store: Arc<RedisStore>, metrics: Metrics) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(15));
        loop {
            interval.tick().await;
            let healthy = store.get_job(JobId::new()).await.is_ok();
            metrics.set_store_connected(healthy);
            if !healthy {
                warn!("store health check failed");
            }
        }
    })
}
