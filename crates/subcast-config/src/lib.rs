#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

//! Environment-variable configuration for every subcast service, loaded and
//! validated once at startup. Missing `BROKER_URL`/`STORE_URL` fail fast;
//! everything else falls back to a documented default.
//!
//! Layout: `env` (typed env-var read helpers), `config` (the per-section
//! structs and `AppConfig`), `error` (config error type).

pub mod config;
pub mod env;
pub mod error;

pub use config::{
    ApiConfig, AppConfig, CatalogConfig, CheckpointConfig, InfraConfig, LanguageDefaults,
    RuntimeConfig, ScannerConfig, TranslationConfig,
};
pub use error::{ConfigError, ConfigResult};
