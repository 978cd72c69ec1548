//! Downloader process startup: connect to the broker, build the catalog
//! client, and run the `subtitle.download` consume loop until the process is
//! asked to stop.

use lapin::Channel;
use subcast_broker::topology::{DOWNLOAD_QUEUE, TRANSLATE_QUEUE, declare_work_queue};
use subcast_broker::{AmqpEventBus, BrokerConnection, TaskDelivery, WorkQueueConsumer, publish_task};
use subcast_catalog::OpenSubtitlesCatalog;
use subcast_config::AppConfig;
use subcast_domain::{DomainError, DownloadTask, TranslationTask};
use subcast_events::{Event, EventBus, EventEnvelope};
use subcast_telemetry::{Metrics, wait_for_shutdown_signal};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};
use crate::pipeline;
use crate::pipeline::DownloadOutcome;

const EVENT_SOURCE: &str = "downloader";
const CONSUMER_TAG: &str = "subcast-downloader";

struct BootstrapDependencies {
    config: AppConfig,
    broker: BrokerConnection,
    catalog: OpenSubtitlesCatalog,
    metrics: Metrics,
}

impl BootstrapDependencies {
    async fn from_env() -> AppResult<Self> {
        let config = AppConfig::from_env().map_err(|err| AppError::config("load_config", err))?;
        let broker = BrokerConnection::connect(&config.infra.broker_url)
            .await
            .map_err(|err| AppError::broker("connect", err))?;
        let catalog = OpenSubtitlesCatalog::new(config.catalog.base_url.clone(), config.catalog.clone())
            .map_err(AppError::catalog)?;
        let metrics = Metrics::new().map_err(|err| AppError::telemetry("build_registry", err))?;

        Ok(Self {
            config,
            broker,
            catalog,
            metrics,
        })
    }
}

/// Load dependencies from the environment and run the consume loop.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env().await?;
    run_app_with(dependencies).await
}

async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    let BootstrapDependencies {
        config,
        broker,
        catalog,
        metrics,
    } = dependencies;

    let event_channel = broker
        .channel()
        .await
        .map_err(|err| AppError::broker("open_event_channel", err))?;
    let event_bus = AmqpEventBus::connect(event_channel, subcast_events::EXCHANGE_NAME)
        .await
        .map_err(|err| AppError::broker("connect_event_bus", err))?;

    let work_channel = broker
        .channel()
        .await
        .map_err(|err| AppError::broker("open_work_channel", err))?;
    declare_work_queue(&work_channel, DOWNLOAD_QUEUE)
        .await
        .map_err(|err| AppError::broker("declare_download_queue", err))?;
    let mut consumer = WorkQueueConsumer::start(work_channel, DOWNLOAD_QUEUE, CONSUMER_TAG)
        .await
        .map_err(|err| AppError::broker("start_consumer", err))?;

    let translate_channel = broker
        .channel()
        .await
        .map_err(|err| AppError::broker("open_translate_channel", err))?;
    declare_work_queue(&translate_channel, TRANSLATE_QUEUE)
        .await
        .map_err(|err| AppError::broker("declare_translate_queue", err))?;

    metrics.set_broker_connected(true);
    info!("downloader consuming subtitle.download");

    let storage_root = std::path::PathBuf::from(&config.infra.storage_root);
    let fallback_language = config.languages.fallback.clone();

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    loop {
        let delivery = tokio::select! {
            _ = shutdown_rx.changed() => {
                info!("shutdown requested, no longer accepting new download tasks");
                break;
            }
            delivery = consumer.next::<DownloadTask>() => match delivery {
                Ok(Some(delivery)) => delivery,
                Ok(None) => {
                    warn!("download consumer stream ended");
                    break;
                }
                Err(err) => {
                    error!(error = %err, "failed to read next download task");
                    metrics.set_broker_connected(false);
                    continue;
                }
            },
        };

        let processing = process_delivery(
            delivery,
            &catalog,
            &storage_root,
            &fallback_language,
            &event_bus,
            &translate_channel,
            &metrics,
        );
        if *shutdown_rx.borrow() {
            if tokio::time::timeout(config.runtime.shutdown_grace, processing)
                .await
                .is_err()
            {
                warn!("shutdown grace period elapsed with a download task in flight, exiting");
                break;
            }
        } else {
            processing.await;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn process_delivery(
    delivery: TaskDelivery<DownloadTask>,
    catalog: &OpenSubtitlesCatalog,
    storage_root: &std::path::Path,
    fallback_language: &str,
    event_bus: &AmqpEventBus,
    translate_channel: &Channel,
    metrics: &Metrics,
) {
    let task = delivery.task.clone();
    info!(job_id = %task.job_id, "processing download task");

    publish(event_bus, metrics, Event::DownloadInProgress { job_id: task.job_id }).await;

    match pipeline::run(&task, catalog, storage_root, fallback_language).await {
        Ok(DownloadOutcome::Ready(path)) => {
            publish(
                event_bus,
                metrics,
                Event::SubtitleReady {
                    job_id: task.job_id,
                    subtitle_path: path.display().to_string(),
                },
            )
            .await;
            metrics.inc_job_completed("download", "success");
            if let Err(err) = delivery.ack().await {
                error!(error = %err, "failed to ack completed download task");
            }
        }
        Ok(DownloadOutcome::TranslateRequested { source_path, source_language }) => {
            let translation_task = TranslationTask {
                job_id: task.job_id,
                subtitle_file_path: source_path.display().to_string(),
                source_language: source_language.clone(),
                target_language: task.language.clone(),
                video_title: task.video_title.clone(),
                created_at: task.created_at,
                retry_count: 0,
            };

            if let Err(err) = publish_task(translate_channel, TRANSLATE_QUEUE, &translation_task).await {
                error!(job_id = %task.job_id, error = %err, "failed to enqueue translation task");
                publish_failure(event_bus, metrics, task.job_id, &DomainError::transient_infra("enqueue_translation_task", err.to_string())).await;
                if let Err(reject_err) = delivery.reject().await {
                    error!(error = %reject_err, "failed to reject download task after enqueue failure");
                }
                return;
            }

            publish(
                event_bus,
                metrics,
                Event::TranslateRequested {
                    job_id: task.job_id,
                    subtitle_path: source_path.display().to_string(),
                    source_language,
                    target_language: task.language.clone(),
                },
            )
            .await;
            metrics.inc_job_completed("download", "success");
            if let Err(err) = delivery.ack().await {
                error!(error = %err, "failed to ack download task handed off to translation");
            }
        }
        Err(err) if is_retryable(&err) => {
            warn!(job_id = %task.job_id, error = %err, "download task failed transiently");
            match delivery.retry_or_dead_letter().await {
                Ok(subcast_broker::RetryOutcome::DeadLettered) => {
                    publish_failure(event_bus, metrics, task.job_id, &err).await;
                }
                Ok(subcast_broker::RetryOutcome::Requeued) => {}
                Err(retry_err) => {
                    error!(error = %retry_err, "failed to retry or dead-letter download task");
                }
            }
        }
        Err(err) => {
            warn!(job_id = %task.job_id, error = %err, "download task failed permanently");
            publish_failure(event_bus, metrics, task.job_id, &err).await;
            if let Err(reject_err) = delivery.reject().await {
                error!(error = %reject_err, "failed to reject non-retryable download task");
            }
        }
    }
}

const fn is_retryable(error: &DomainError) -> bool {
    matches!(
        error,
        DomainError::CatalogRateLimit | DomainError::CatalogTransient { .. } | DomainError::TransientInfra { .. }
    )
}

async fn publish_failure(
    event_bus: &AmqpEventBus,
    metrics: &Metrics,
    job_id: subcast_domain::JobId,
    error: &DomainError,
) {
    metrics.inc_job_completed("download", "failed");
    publish(
        event_bus,
        metrics,
        Event::JobFailed {
            job_id,
            error_type: error.error_type().to_string(),
            message: error.to_string(),
        },
    )
    .await;
}

async fn publish(event_bus: &AmqpEventBus, metrics: &Metrics, event: Event) {
    let kind = event.kind();
    let envelope = EventEnvelope::new(EVENT_SOURCE, event);
    if let Err(err) = event_bus.publish(envelope).await {
        error!(error = %err, kind, "failed to publish event");
        return;
    }
    metrics.inc_event(kind);
}
