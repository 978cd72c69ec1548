//! Typed configuration sections, one per `spec.md` §6 environment group.

use std::time::Duration;

use crate::env::{optional, optional_list, optional_parsed, required};
use crate::error::ConfigResult;

/// Broker and store connection strings. The only two keys the spec requires
/// to be present at startup.
#[derive(Debug, Clone)]
pub struct InfraConfig {
    /// `BROKER_URL` — AMQP connection string.
    pub broker_url: String,
    /// `STORE_URL` — Redis connection string.
    pub store_url: String,
    /// `STORAGE_ROOT` — subtitle output directory.
    pub storage_root: String,
}

impl InfraConfig {
    fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            broker_url: required("BROKER_URL")?,
            store_url: required("STORE_URL")?,
            storage_root: optional("STORAGE_ROOT", "./subtitles"),
        })
    }
}

/// Language defaults applied when a request omits them.
#[derive(Debug, Clone)]
pub struct LanguageDefaults {
    /// `SOURCE_LANG_DEFAULT`.
    pub source_default: String,
    /// `TARGET_LANG_DEFAULT`, when the caller has not specified one.
    pub target_default: Option<String>,
    /// `FALLBACK_LANG` — tried when the requested language has no direct hit.
    pub fallback: String,
}

impl LanguageDefaults {
    fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            source_default: optional("SOURCE_LANG_DEFAULT", "en"),
            target_default: std::env::var("TARGET_LANG_DEFAULT").ok(),
            fallback: optional("FALLBACK_LANG", "en"),
        })
    }
}

/// Chunking, tokenization, and concurrency parameters for the translator.
#[derive(Debug, Clone)]
pub struct TranslationConfig {
    /// `TRANSLATION_MODEL` — drives tokenizer table selection.
    pub model: String,
    /// `TRANSLATION_MAX_TOKENS_PER_CHUNK`.
    pub max_tokens_per_chunk: u32,
    /// `TRANSLATION_MAX_SEGMENTS_PER_CHUNK`.
    pub max_segments_per_chunk: u32,
    /// `TRANSLATION_TOKEN_SAFETY_MARGIN`.
    pub token_safety_margin: f64,
    /// `TRANSLATION_PARALLEL_REQUESTS` — low-tier concurrency limit.
    pub parallel_requests: usize,
    /// `TRANSLATION_PARALLEL_REQUESTS_HIGH_TIER` — high-tier concurrency limit.
    pub parallel_requests_high_tier: usize,
    /// `OPENAI_MAX_RETRIES` — per-chunk retry budget before a chunk is
    /// surfaced as failed.
    pub openai_max_retries: u32,
    /// `OPENAI_BASE_URL` — base URL the translator's LLM client talks to.
    pub openai_base_url: String,
    /// `OPENAI_API_KEY` — credential for the translator's LLM client. Left
    /// unset in any binary that does not perform translation.
    pub openai_api_key: Option<String>,
}

impl TranslationConfig {
    fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            model: optional("TRANSLATION_MODEL", "gpt-4o-mini"),
            max_tokens_per_chunk: optional_parsed("TRANSLATION_MAX_TOKENS_PER_CHUNK", 4_000)?,
            max_segments_per_chunk: optional_parsed("TRANSLATION_MAX_SEGMENTS_PER_CHUNK", 100)?,
            token_safety_margin: optional_parsed("TRANSLATION_TOKEN_SAFETY_MARGIN", 0.8)?,
            parallel_requests: optional_parsed("TRANSLATION_PARALLEL_REQUESTS", 3)?,
            parallel_requests_high_tier: optional_parsed(
                "TRANSLATION_PARALLEL_REQUESTS_HIGH_TIER",
                6,
            )?,
            openai_max_retries: optional_parsed("OPENAI_MAX_RETRIES", 3)?,
            openai_base_url: optional("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
        })
    }

    /// Effective per-chunk token budget: `max_tokens_per_chunk × safety_margin`.
    #[must_use]
    pub fn effective_token_budget(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let budget = (f64::from(self.max_tokens_per_chunk) * self.token_safety_margin) as u32;
        budget.max(1)
    }
}

/// Checkpoint retention behavior.
#[derive(Debug, Clone)]
pub struct CheckpointConfig {
    /// `CHECKPOINT_ENABLED`.
    pub enabled: bool,
    /// `CHECKPOINT_CLEANUP_ON_SUCCESS`.
    pub cleanup_on_success: bool,
}

impl CheckpointConfig {
    fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            enabled: optional_parsed("CHECKPOINT_ENABLED", true)?,
            cleanup_on_success: optional_parsed("CHECKPOINT_CLEANUP_ON_SUCCESS", true)?,
        })
    }
}

/// Subtitle catalog credentials and retry policy.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// `CATALOG_USER`.
    pub user: Option<String>,
    /// `CATALOG_PASSWORD`.
    pub password: Option<String>,
    /// `CATALOG_USER_AGENT`.
    pub user_agent: String,
    /// `CATALOG_MAX_RETRIES`.
    pub max_retries: u32,
    /// `CATALOG_RETRY_DELAY`, in seconds.
    pub retry_delay: Duration,
    /// `CATALOG_RETRY_MAX_DELAY`, in seconds.
    pub retry_max_delay: Duration,
    /// `CATALOG_RETRY_EXPONENTIAL_BASE`.
    pub retry_exponential_base: f64,
    /// `CATALOG_BASE_URL` — base URL of the catalog's REST API.
    pub base_url: String,
}

impl CatalogConfig {
    fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            user: std::env::var("CATALOG_USER").ok(),
            password: std::env::var("CATALOG_PASSWORD").ok(),
            user_agent: optional("CATALOG_USER_AGENT", "subcast/0.1"),
            base_url: optional("CATALOG_BASE_URL", "https://rest.opensubtitles.org"),
            max_retries: optional_parsed("CATALOG_MAX_RETRIES", 3)?,
            retry_delay: Duration::from_secs_f64(optional_parsed("CATALOG_RETRY_DELAY", 1.0)?),
            retry_max_delay: Duration::from_secs_f64(optional_parsed(
                "CATALOG_RETRY_MAX_DELAY",
                60.0,
            )?),
            retry_exponential_base: optional_parsed("CATALOG_RETRY_EXPONENTIAL_BASE", 2.0)?,
        })
    }
}

/// Scanner intake configuration: filesystem watch, webhook, WebSocket.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// `SCANNER_WATCH_DIRS`, comma-separated directories to watch recursively.
    pub watch_dirs: Vec<String>,
    /// `SCANNER_MEDIA_EXTENSIONS`, parsed into a list like `.mkv`.
    pub media_extensions: Vec<String>,
    /// `SCANNER_DEBOUNCE_MS` — quiet period before a new file is considered stable.
    pub debounce: Duration,
    /// `MEDIA_SERVER_URL` — base URL for the WebSocket client and webhook source.
    pub media_server_url: Option<String>,
    /// `MEDIA_SERVER_API_KEY`.
    pub media_server_api_key: Option<String>,
    /// `WS_RECONNECT_DELAY`, in seconds.
    pub ws_reconnect_delay: Duration,
    /// `WS_MAX_RECONNECT_DELAY`, in seconds.
    pub ws_max_reconnect_delay: Duration,
    /// `FALLBACK_SYNC_INTERVAL_HOURS`.
    pub fallback_sync_interval: Duration,
}

impl ScannerConfig {
    fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            watch_dirs: optional_list("SCANNER_WATCH_DIRS", ""),
            media_extensions: optional_list(
                "SCANNER_MEDIA_EXTENSIONS",
                ".mp4,.mkv,.avi,.mov,.wmv,.flv,.webm,.m4v",
            ),
            debounce: Duration::from_millis(optional_parsed("SCANNER_DEBOUNCE_MS", 500)?),
            media_server_url: std::env::var("MEDIA_SERVER_URL").ok(),
            media_server_api_key: std::env::var("MEDIA_SERVER_API_KEY").ok(),
            ws_reconnect_delay: Duration::from_secs_f64(optional_parsed(
                "WS_RECONNECT_DELAY",
                2.0,
            )?),
            ws_max_reconnect_delay: Duration::from_secs_f64(optional_parsed(
                "WS_MAX_RECONNECT_DELAY",
                300.0,
            )?),
            fallback_sync_interval: Duration::from_secs(
                optional_parsed::<u64>("FALLBACK_SYNC_INTERVAL_HOURS", 24)? * 3_600,
            ),
        })
    }
}

/// HTTP surface bind configuration for the orchestrator and the scanner's
/// webhook listener. Not named explicitly in `spec.md` §6 (which specifies
/// the boundary's contract, not its transport), but every axum-fronted
/// binary needs one.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `API_BIND_ADDR` — address the orchestrator's HTTP server binds to.
    pub bind_addr: String,
    /// `SCANNER_BIND_ADDR` — address the scanner's webhook listener binds to.
    pub scanner_bind_addr: String,
    /// `ORCHESTRATOR_URL` — base URL the scanner submits downloads against.
    pub orchestrator_url: String,
}

impl ApiConfig {
    fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            bind_addr: optional("API_BIND_ADDR", "0.0.0.0:8080"),
            scanner_bind_addr: optional("SCANNER_BIND_ADDR", "0.0.0.0:8081"),
            orchestrator_url: optional("ORCHESTRATOR_URL", "http://127.0.0.1:8080"),
        })
    }
}

/// Graceful-shutdown timing, shared by every long-running worker binary.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// `WORKER_SHUTDOWN_GRACE_SECONDS` — how long a worker waits for its
    /// in-flight task to finish after SIGTERM/SIGINT before exiting anyway.
    pub shutdown_grace: Duration,
}

impl RuntimeConfig {
    fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            shutdown_grace: Duration::from_secs(optional_parsed(
                "WORKER_SHUTDOWN_GRACE_SECONDS",
                30,
            )?),
        })
    }
}

/// Full process configuration. Each binary holds the whole struct but
/// typically reads only the sections relevant to its role.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Broker/store connection strings and the subtitle output directory.
    pub infra: InfraConfig,
    /// Language defaults.
    pub languages: LanguageDefaults,
    /// Translator chunking/tokenization/concurrency parameters.
    pub translation: TranslationConfig,
    /// Checkpoint retention behavior.
    pub checkpoint: CheckpointConfig,
    /// Subtitle catalog credentials and retry policy.
    pub catalog: CatalogConfig,
    /// Scanner intake configuration.
    pub scanner: ScannerConfig,
    /// HTTP bind addresses for the orchestrator and scanner.
    pub api: ApiConfig,
    /// Graceful-shutdown grace period.
    pub runtime: RuntimeConfig,
    /// `LOG_LEVEL` — passed straight through to `subcast-telemetry`.
    pub log_level: String,
}

impl AppConfig {
    /// Load and validate configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ConfigError::MissingEnv`] if `BROKER_URL` or
    /// `STORE_URL` are unset, or
    /// [`crate::error::ConfigError::Invalid`] if any typed value fails to parse.
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            infra: InfraConfig::from_env()?,
            languages: LanguageDefaults::from_env()?,
            translation: TranslationConfig::from_env()?,
            checkpoint: CheckpointConfig::from_env()?,
            catalog: CatalogConfig::from_env()?,
            scanner: ScannerConfig::from_env()?,
            api: ApiConfig::from_env()?,
            runtime: RuntimeConfig::from_env()?,
            log_level: optional("LOG_LEVEL", "info"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_token_budget_applies_safety_margin() {
        let config = TranslationConfig {
            model: "test".into(),
            max_tokens_per_chunk: 4_000,
            max_segments_per_chunk: 100,
            token_safety_margin: 0.8,
            parallel_requests: 3,
            parallel_requests_high_tier: 6,
            openai_max_retries: 3,
            openai_base_url: "https://api.openai.com/v1".into(),
            openai_api_key: None,
        };
        assert_eq!(config.effective_token_budget(), 3_200);
    }

    #[test]
    fn missing_required_var_fails_fast() {
        let err = crate::env::required("SUBCAST_CONFIG_TEST_DEFINITELY_UNSET")
            .expect_err("unset variable must be reported as missing");
        assert!(matches!(
            err,
            crate::error::ConfigError::MissingEnv {
                name: "SUBCAST_CONFIG_TEST_DEFINITELY_UNSET"
            }
        ));
    }
}
