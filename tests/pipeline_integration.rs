//! End-to-end pipeline coverage through the umbrella crate: in-memory
//! document, static vocabulary source, stub translator.

use std::sync::Arc;

use lexgloss::{
    annotate_document, AnnotationScanner, CacheConfig, MatchOptions, MemoryDocument, RankMode,
    FrequencyProvider, FrequencyProviderConfig, ScanConfig, ScanStatus, StaticSource,
    StubTranslator, TagMode, TaggedProvider, TaggedProviderConfig, VocabularyEntry,
    VocabularyService,
};

async fn tagged_vocabulary(entries: Vec<VocabularyEntry>, options: MatchOptions) -> Arc<VocabularyService> {
    let source = Arc::new(StaticSource::new().with_tagged_tier("core", entries));
    let service = VocabularyService::new(&CacheConfig::default());
    service.register(Arc::new(TaggedProvider::new(
        source,
        TaggedProviderConfig::default(),
    )));
    service
        .set_active_provider("tagged", options)
        .await
        .expect("provider activation");
    Arc::new(service)
}

fn cet6_any() -> MatchOptions {
    MatchOptions::default()
        .with_target_tags(["cet6", "toefl"])
        .with_mode(TagMode::Any)
}

#[tokio::test]
async fn two_units_one_word_counts() {
    let document = Arc::new(MemoryDocument::new());
    document.push_unit("fresh apple");
    document.push_unit("another apple");

    let vocabulary = tagged_vocabulary(
        vec![VocabularyEntry::new("apple").with_tags(["cet6"])],
        cet6_any(),
    )
    .await;

    let result = annotate_document(
        document.clone(),
        vocabulary,
        Arc::new(StubTranslator::new()),
        ScanConfig::default(),
    )
    .await
    .expect("valid config");

    assert_eq!(result.status, ScanStatus::Completed);
    assert_eq!(result.words_to_annotate, 1, "unique word count");
    assert_eq!(result.annotations_applied, 2, "one per occurrence");
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn annotations_render_into_the_document() {
    let document = Arc::new(MemoryDocument::new());
    document.push_unit("The verdict was unanimous.");

    let vocabulary = tagged_vocabulary(
        vec![
            VocabularyEntry::new("verdict").with_tags(["toefl"]),
            VocabularyEntry::new("unanimous").with_tags(["cet6"]),
        ],
        cet6_any(),
    )
    .await;

    let result = annotate_document(
        document.clone(),
        vocabulary,
        Arc::new(StubTranslator::new()),
        ScanConfig::default().with_languages("en", "fr"),
    )
    .await
    .expect("valid config");

    assert_eq!(result.annotations_applied, 2);
    assert_eq!(
        document.render(),
        "The verdict[fr:verdict] was unanimous[fr:unanimous]."
    );
}

#[tokio::test]
async fn frequency_provider_end_to_end() {
    let document = Arc::new(MemoryDocument::new());
    document.push_unit("the sesquipedalian word");

    let source = Arc::new(StaticSource::new().with_tagged_tier(
        "core",
        [
            VocabularyEntry::new("the").with_rank(1),
            VocabularyEntry::new("word").with_rank(400),
        ],
    ));
    let service = VocabularyService::new(&CacheConfig::default());
    service.register(Arc::new(FrequencyProvider::new(
        source,
        FrequencyProviderConfig::new(5000, RankMode::Below),
    )));
    service
        .set_active_provider("frequency", MatchOptions::default())
        .await
        .expect("activation");

    let result = annotate_document(
        document.clone(),
        Arc::new(service),
        Arc::new(StubTranslator::new()),
        ScanConfig::default(),
    )
    .await
    .expect("valid config");

    // Unknown word annotated (treated as rare); common ranked words skipped.
    assert_eq!(result.annotations_applied, 1);
    assert!(document.render().contains("sesquipedalian["));
    assert!(!document.render().contains("the["));
}

#[tokio::test]
async fn removal_roundtrip_preserves_original_text() {
    let document = Arc::new(MemoryDocument::new());
    document.push_unit("An apple a day.");
    let original = document.render();

    let vocabulary = tagged_vocabulary(
        vec![VocabularyEntry::new("apple").with_tags(["cet6"])],
        cet6_any(),
    )
    .await;
    let scanner = AnnotationScanner::new(
        document.clone(),
        vocabulary,
        Arc::new(StubTranslator::new()),
        ScanConfig::default(),
    )
    .expect("valid config");

    assert_eq!(scanner.scan().await.annotations_applied, 1);
    assert_ne!(document.render(), original);

    assert_eq!(scanner.remove_annotations(), 1);
    assert_eq!(document.render(), original);
    assert_eq!(scanner.remove_annotations(), 0);
    assert_eq!(document.render(), original);
}

#[tokio::test]
async fn offline_demo_smoke() {
    let (_, result) = lexgloss::offline_demo().await.expect("demo runs");
    assert_eq!(result.status, ScanStatus::Completed);
    assert!(result.annotations_applied >= 3);
}
