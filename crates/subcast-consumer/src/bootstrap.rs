//! Event consumer startup: connect to the broker and store, then apply
//! every published event to its job record until the process is asked to
//! stop.

use std::sync::Arc;

use chrono::Utc;
use subcast_broker::{AmqpEventBus, BrokerConnection};
use subcast_config::AppConfig;
use subcast_events::{ALL_EVENTS_BINDING, EventBus, EventEnvelope};
use subcast_store::{AuditEntry, JobStore, RedisStore};
use subcast_telemetry::{Metrics, wait_for_shutdown_signal};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::apply::apply_event;
use crate::error::{AppError, AppResult};

struct BootstrapDependencies {
    config: AppConfig,
    broker: BrokerConnection,
    store: Arc<RedisStore>,
    metrics: Metrics,
}

impl BootstrapDependencies {
    async fn from_env() -> AppResult<Self> {
        let config = AppConfig::from_env().map_err(|err| AppError::config("load_config", err))?;
        let broker = BrokerConnection::connect(&config.infra.broker_url)
            .await
            .map_err(|err| AppError::broker("connect", err))?;
        let store = RedisStore::connect(&config.infra.store_url)
            .await
            .map_err(|err| AppError::store("connect_store", err))?;
        let metrics = Metrics::new().map_err(|err| AppError::telemetry("build_registry", err))?;

        Ok(Self {
            config,
            broker,
            store: Arc::new(store),
            metrics,
        })
    }
}

/// Load dependencies from the environment and run the apply loop.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env().await?;
    run_app_with(dependencies).await
}

async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
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
    let event_bus = AmqpEventBus::connect(event_channel, subcast_events::EXCHANGE_NAME)
        .await
        .map_err(|err| AppError::broker("connect_event_bus", err))?;

    metrics.set_broker_connected(true);
    metrics.set_store_connected(true);
    info!("consumer applying events from {}", ALL_EVENTS_BINDING);

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let mut subscription = event_bus.subscribe(ALL_EVENTS_BINDING);
    loop {
        let envelope = tokio::select! {
            _ = shutdown_rx.changed() => {
                info!("shutdown requested, stopping event consumer");
                break;
            }
            envelope = subscription.recv() => match envelope {
                Some(envelope) => envelope,
                None => {
                    warn!("event consumer subscription closed");
                    break;
                }
            },
        };

        let applying = handle_envelope(store.as_ref(), &metrics, envelope);
        let outcome = if *shutdown_rx.borrow() {
            match tokio::time::timeout(config.runtime.shutdown_grace, applying).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("shutdown grace period elapsed while applying an event, exiting");
                    break;
                }
            }
        } else {
            applying.await
        };

        if let Err(err) = outcome {
            error!(error = %err, "failed to apply event to job record");
            metrics.set_store_connected(false);
        } else {
            metrics.set_store_connected(true);
        }
    }

    Ok(())
}

async fn handle_envelope(
    store: &RedisStore,
    metrics: &Metrics,
    envelope: EventEnvelope,
) -> subcast_store::StoreResult<()> {
    let Some(job_id) = envelope.payload.job_id() else {
        return Ok(());
    };

    let audit = AuditEntry {
        envelope: envelope.clone(),
        received_at: Utc::now(),
    };
    store.append_audit_entry(job_id, &audit).await?;

    let Some(mut record) = store.get_job(job_id).await? else {
        warn!(%job_id, kind = envelope.payload.kind(), "event referenced a job with no record yet");
        return Ok(());
    };

    let previous_status = record.status;
    apply_event(&mut record, &envelope.payload, Utc::now());
    store.put_job(&record).await?;

    if previous_status != record.status {
        metrics.inc_event(envelope.payload.kind());
        info!(%job_id, from = ?previous_status, to = ?record.status, "job transitioned");
    }

    Ok(())
}
