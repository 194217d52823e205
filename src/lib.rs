//! Workspace umbrella crate for the LEXGLOSS lexical annotation engine.
//!
//! Stitches the member crates together so callers can wire a document, a
//! vocabulary, and a translator into a working annotation pipeline with a
//! single API entry point.
//!
//! ```no_run
//! use std::sync::Arc;
//! use lexgloss::{
//!     annotate_document, CacheConfig, MatchOptions, MemoryDocument, ScanConfig,
//!     StaticSource, StubTranslator, TagMode, TaggedProvider, TaggedProviderConfig,
//!     VocabularyEntry, VocabularyService,
//! };
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let document = Arc::new(MemoryDocument::new());
//! document.push_unit("An apple a day keeps the doctor away.");
//!
//! let source = Arc::new(StaticSource::new().with_tagged_tier(
//!     "core",
//!     [VocabularyEntry::new("apple").with_tags(["cet6"])],
//! ));
//! let vocabulary = Arc::new(VocabularyService::new(&CacheConfig::default()));
//! vocabulary.register(Arc::new(TaggedProvider::new(
//!     source,
//!     TaggedProviderConfig::default(),
//! )));
//! vocabulary
//!     .set_active_provider(
//!         "tagged",
//!         MatchOptions::default()
//!             .with_target_tags(["cet6"])
//!             .with_mode(TagMode::Any),
//!     )
//!     .await?;
//!
//! let result = annotate_document(
//!     document,
//!     vocabulary,
//!     Arc::new(StubTranslator::new()),
//!     ScanConfig::default(),
//! )
//! .await?;
//! assert_eq!(result.annotations_applied, 1);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

pub use cache::{spawn_sweeper, CacheConfig, CacheConfigError, CacheStats, SweeperHandle, TtlCache};
pub use context::extract_context;
pub use scanner::{
    AnnotationScanner, Definition, DocumentError, DocumentModel, Fragment, MemoryDocument,
    Phonetic, ProgressCallback, ScanConfig, ScanConfigError, ScanFailure, ScanProgress,
    ScanResult, ScanStatus, StubTranslator, TranslateError, TranslateRequest, TranslationResult,
    Translator, UnitRef, WordOccurrence,
};
pub use vocab::{
    normalize_word, FrequencyProvider, FrequencyProviderConfig, MatchOptions, OrdinalProvider,
    OrdinalProviderConfig, RankMode, StaticSource, TagMode, TaggedProvider, TaggedProviderConfig,
    TierData, TierMode, VocabError, VocabularyEntry, VocabularyProvider, VocabularyService,
    VocabularySource,
};

/// Run one scan over `document` with an ad hoc scanner.
///
/// Convenience for one-shot use; hold an [`AnnotationScanner`] directly when
/// you need progress callbacks, `abort`, or `remove_annotations`.
pub async fn annotate_document(
    document: Arc<dyn DocumentModel>,
    vocabulary: Arc<VocabularyService>,
    translator: Arc<dyn Translator>,
    config: ScanConfig,
) -> Result<ScanResult, ScanConfigError> {
    let scanner = AnnotationScanner::new(document, vocabulary, translator, config)?;
    Ok(scanner.scan().await)
}

/// Fully offline demo pipeline: a small in-memory document annotated from a
/// bundled word list through the stub translator. Useful for smoke tests
/// and as wiring documentation.
pub async fn offline_demo() -> Result<(Arc<MemoryDocument>, ScanResult), Box<dyn std::error::Error>>
{
    let document = Arc::new(MemoryDocument::new());
    document.push_unit("The committee reached a consensus after a long debate.");
    document.push_unit("Her eloquent speech made the outcome inevitable.");

    let source = Arc::new(StaticSource::new().with_tagged_tier(
        "core",
        [
            VocabularyEntry::new("consensus").with_tags(["cet6", "toefl"]),
            VocabularyEntry::new("eloquent").with_tags(["gre", "toefl"]),
            VocabularyEntry::new("inevitable").with_tags(["cet6"]),
            VocabularyEntry::new("committee").with_tags(["cet4"]),
        ],
    ));
    let vocabulary = Arc::new(VocabularyService::new(&CacheConfig::default()));
    vocabulary.register(Arc::new(TaggedProvider::new(
        source,
        TaggedProviderConfig::default(),
    )));
    vocabulary
        .set_active_provider(
            "tagged",
            MatchOptions::default()
                .with_target_tags(["cet6", "toefl", "gre"])
                .with_mode(TagMode::Any),
        )
        .await?;

    let result = annotate_document(
        document.clone(),
        vocabulary,
        Arc::new(StubTranslator::new()),
        ScanConfig::default(),
    )
    .await?;

    Ok((document, result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn offline_demo_annotates_target_words() {
        let (document, result) = offline_demo().await.expect("demo pipeline");

        assert_eq!(result.status, ScanStatus::Completed);
        assert_eq!(result.words_to_annotate, 3);
        assert_eq!(result.annotations_applied, 3);
        assert!(result.errors.is_empty());

        let rendered = document.render();
        assert!(rendered.contains("consensus["));
        assert!(rendered.contains("eloquent["));
        assert!(rendered.contains("inevitable["));
        // `committee` carries only the base tag; not annotated.
        assert!(!rendered.contains("committee["));
    }
}
