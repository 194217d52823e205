//! LEXGLOSS annotation scanner.
//!
//! This is where the engine earns its keep: one full pass over a document,
//! in four stages.
//!
//! 1. **Collect** — walk the document's text units and pull out every
//!    word-shaped substring with its byte offsets
//! 2. **Match** — one bulk vocabulary query over the unique normalized words
//! 3. **Enrich** — translate matched words with bounded concurrency, each
//!    request carrying a sentence-bounded context window; one word's failure
//!    never sinks the batch
//! 4. **Apply** — splice annotation fragments into each affected unit,
//!    processing occurrences last-to-first so offsets stay valid, one atomic
//!    replacement per unit
//!
//! A scan always terminates with a [`ScanResult`]; re-entrant scans are
//! rejected, not queued; [`AnnotationScanner::abort`] cancels cooperatively
//! between stages. The document and translation backends stay behind the
//! [`DocumentModel`] and [`Translator`] traits — [`MemoryDocument`] and
//! [`StubTranslator`] ship as in-crate reference implementations.

mod document;
mod engine;
mod memory;
mod translate;
mod types;
mod words;

pub use crate::document::{DocumentError, DocumentModel, Fragment, UnitRef};
pub use crate::engine::AnnotationScanner;
pub use crate::memory::MemoryDocument;
pub use crate::translate::{
    Definition, Phonetic, StubTranslator, TranslateError, TranslateRequest, TranslationResult,
    Translator,
};
pub use crate::types::{
    ProgressCallback, ScanConfig, ScanConfigError, ScanFailure, ScanProgress, ScanResult,
    ScanStatus, WordOccurrence,
};
pub use crate::words::{extract_words, RawWord};
