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

//! Engine-agnostic job/task/event domain types shared across the subcast workspace.
//!
//! Layout: `ids` (newtype identifiers), `job` (job record + status transition
//! table), `task` (download/translate work queue payloads), `checkpoint`
//! (translation resume state), `catalog` (pluggable subtitle catalog
//! capability), `translation` (pluggable LLM translation capability),
//! `validate` (request-boundary validation helpers), `error` (shared error type).

pub mod catalog;
pub mod checkpoint;
pub mod error;
pub mod ids;
pub mod job;
pub mod task;
pub mod translation;
pub mod validate;

pub use catalog::{CatalogSearchResult, SubtitleCatalog};
pub use checkpoint::TranslationCheckpoint;
pub use error::{DomainError, DomainResult};
pub use ids::{EventId, JobId};
pub use job::{JobRecord, JobStatus, apply_transition};
pub use task::{DownloadTask, TranslationTask};
pub use translation::{TranslatedSegment, TranslationProvider, TranslationRequest};
pub use validate::{is_valid_language_code, normalize_video_url};
