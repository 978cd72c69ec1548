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

//! Subtitle parsing, token-budget chunking, and checkpointed translation.
//!
//! Layout: `srt` (tolerant SubRip parsing/writing), `chunk` (token-budget and
//! segment-count chunking), `llm` (`OpenAI`-shaped `TranslationProvider`),
//! `pipeline` (the end-to-end, checkpoint-resumable orchestration), `error`
//! (translator error taxonomy).

pub mod chunk;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod srt;

pub use chunk::{Chunk, build_chunks};
pub use error::{TranslateError, TranslateResult};
pub use llm::OpenAiTranslationProvider;
pub use pipeline::{TranslationOutcome, run};
pub use srt::Cue;
