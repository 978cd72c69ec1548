//! Translator worker startup: connect to the broker and store, build the
//! LLM-backed translation provider, and run the `subtitle.translate`
//! consume loop until the process is asked to stop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use subcast_broker::topology::{TRANSLATE_QUEUE, declare_work_queue};
use subcast_broker::{AmqpEventBus, BrokerConnection, RetryOutcome, TaskDelivery, WorkQueueConsumer};
use subcast_config::{AppConfig, CheckpointConfig, TranslationConfig};
use subcast_domain::{DomainError, TranslationTask};
use subcast_events::{Event, EventBus, EventEnvelope};
use subcast_store::{JobStore, RedisStore};
use subcast_telemetry::{Metrics, wait_for_shutdown_signal};
use subcast_translate::OpenAiTranslationProvider;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};

const EVENT_SOURCE: &str = "translator-worker";
const CONSUMER_TAG: &str = "subcast-translator-worker";

struct BootstrapDependencies {
    config: AppConfig,
    broker: BrokerConnection,
    store: Arc<RedisStore>,
    provider: OpenAiTranslationProvider,
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

        let api_key = config.translation.openai_api_key.clone().ok_or_else(|| {
            AppError::invalid_config("OPENAI_API_KEY", "translator worker requires an OpenAI API key")
        })?;
        let provider = OpenAiTranslationProvider::new(
            config.translation.openai_base_url.clone(),
            api_key,
            config.translation.model.clone(),
        )
        .map_err(AppError::provider)?;

        let metrics = Metrics::new().map_err(|err| AppError::telemetry("build_registry", err))?;

        Ok(Self {
            config,
            broker,
            store: Arc::new(store),
            provider,
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
        store,
        provider,
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
    declare_work_queue(&work_channel, TRANSLATE_QUEUE)
        .await
        .map_err(|err| AppError::broker("declare_translate_queue", err))?;
    let mut consumer = WorkQueueConsumer::start(work_channel, TRANSLATE_QUEUE, CONSUMER_TAG)
        .await
        .map_err(|err| AppError::broker("start_consumer", err))?;

    metrics.set_broker_connected(true);
    metrics.set_store_connected(true);
    info!("translator worker consuming subtitle.translate");

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    loop {
        let delivery = tokio::select! {
            _ = shutdown_rx.changed() => {
                info!("shutdown requested, no longer accepting new translation tasks");
                break;
            }
            delivery = consumer.next::<TranslationTask>() => match delivery {
                Ok(Some(delivery)) => delivery,
                Ok(None) => {
                    warn!("translate consumer stream ended");
                    break;
                }
                Err(err) => {
                    error!(error = %err, "failed to read next translation task");
                    metrics.set_broker_connected(false);
                    continue;
                }
            },
        };

        let processing = process_delivery(
            delivery,
            &provider,
            store.as_ref(),
            &config.translation,
            &config.checkpoint,
            &event_bus,
            &metrics,
        );
        if *shutdown_rx.borrow() {
            if tokio::time::timeout(config.runtime.shutdown_grace, processing)
                .await
                .is_err()
            {
                warn!("shutdown grace period elapsed with a translation task in flight, exiting");
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
    delivery: TaskDelivery<TranslationTask>,
    provider: &OpenAiTranslationProvider,
    store: &RedisStore,
    translation_config: &TranslationConfig,
    checkpoint_config: &CheckpointConfig,
    event_bus: &AmqpEventBus,
    metrics: &Metrics,
) {
    let task = delivery.task.clone();
    info!(job_id = %task.job_id, "processing translation task");

    let source_srt = match tokio::fs::read_to_string(&task.subtitle_file_path).await {
        Ok(contents) => contents,
        Err(err) => {
            warn!(job_id = %task.job_id, error = %err, "failed to read source subtitle");
            publish_translation_failed(event_bus, metrics, task.job_id, None, err.to_string()).await;
            if let Err(reject_err) = delivery.reject().await {
                error!(error = %reject_err, "failed to reject unreadable translation task");
            }
            return;
        }
    };

    let outcome = subcast_translate::run(
        task.job_id,
        &source_srt,
        &task.source_language,
        &task.target_language,
        provider,
        store,
        translation_config,
        parallel_requests_for_model(translation_config),
    )
    .await;

    match outcome {
        Ok(result) => {
            let result_path = result_path_for(&task.subtitle_file_path, &task.target_language);
            if let Err(err) = write_result(&result_path, &result.rendered_srt).await {
                error!(job_id = %task.job_id, error = %err, "failed to write translated subtitle");
                metrics.inc_job_completed("translate", "failed");
                publish_translation_failed(event_bus, metrics, task.job_id, None, err.to_string()).await;
                if let Err(reject_err) = delivery.reject().await {
                    error!(error = %reject_err, "failed to reject translation task after write failure");
                }
                return;
            }

            publish(
                event_bus,
                metrics,
                Event::TranslationCompleted {
                    job_id: task.job_id,
                    result_path: result_path.display().to_string(),
                },
            )
            .await;
            metrics.inc_job_completed("translate", "success");

            if checkpoint_config.cleanup_on_success {
                if let Err(err) = store.delete_checkpoint(task.job_id).await {
                    warn!(job_id = %task.job_id, error = %err, "failed to delete checkpoint after successful translation");
                }
            }

            if let Err(err) = delivery.ack().await {
                error!(error = %err, "failed to ack completed translation task");
            }
        }
        Err(translate_err) => {
            let domain_err = translate_err.into_domain();
            if is_retryable(&domain_err) {
                warn!(job_id = %task.job_id, error = %domain_err, "translation task failed transiently");
                match delivery.retry_or_dead_letter().await {
                    Ok(RetryOutcome::DeadLettered) => {
                        metrics.inc_job_completed("translate", "failed");
                        publish(
                            event_bus,
                            metrics,
                            Event::JobFailed {
                                job_id: task.job_id,
                                error_type: domain_err.error_type().to_string(),
                                message: domain_err.to_string(),
                            },
                        )
                        .await;
                    }
                    Ok(RetryOutcome::Requeued) => {}
                    Err(retry_err) => {
                        error!(error = %retry_err, "failed to retry or dead-letter translation task");
                    }
                }
            } else {
                warn!(job_id = %task.job_id, error = %domain_err, "translation task failed permanently");
                metrics.inc_job_completed("translate", "failed");
                let chunk_index = match &domain_err {
                    DomainError::ChunkFailed { chunk_index, .. } => Some(*chunk_index),
                    _ => None,
                };
                publish_translation_failed(event_bus, metrics, task.job_id, chunk_index, domain_err.to_string()).await;
                if let Err(reject_err) = delivery.reject().await {
                    error!(error = %reject_err, "failed to reject non-retryable translation task");
                }
            }
        }
    }
}

const fn is_retryable(error: &DomainError) -> bool {
    matches!(error, DomainError::TransientInfra { .. })
}

/// Models outside the low-cost "mini"/"3.5" family get the high-tier
/// concurrency limit; the default `gpt-4o-mini` stays low-tier.
fn parallel_requests_for_model(config: &TranslationConfig) -> usize {
    let model = config.model.to_ascii_lowercase();
    if model.contains("mini") || model.contains("3.5") {
        config.parallel_requests
    } else {
        config.parallel_requests_high_tier
    }
}

fn result_path_for(source_path: &str, target_language: &str) -> PathBuf {
    let source = Path::new(source_path);
    let stem = source.file_stem().and_then(|stem| stem.to_str()).unwrap_or("subtitle");
    let file_name = format!("{stem}.{target_language}.srt");
    source.with_file_name(file_name)
}

async fn write_result(path: &Path, rendered_srt: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, rendered_srt).await
}

async fn publish_translation_failed(
    event_bus: &AmqpEventBus,
    metrics: &Metrics,
    job_id: subcast_domain::JobId,
    chunk_index: Option<usize>,
    message: String,
) {
    publish(
        event_bus,
        metrics,
        Event::TranslationFailed {
            job_id,
            chunk_index,
            message,
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
