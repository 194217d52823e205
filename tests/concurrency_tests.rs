//! Concurrency behavior: the enrichment bound, re-entrancy rejection, and
//! cooperative abort.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lexgloss::{
    AnnotationScanner, CacheConfig, MatchOptions, MemoryDocument, ScanConfig, ScanStatus,
    StaticSource, StubTranslator, TagMode, TaggedProvider, TaggedProviderConfig, TranslateError,
    TranslateRequest, TranslationResult, Translator, VocabularyEntry, VocabularyService,
};

/// Wraps the stub translator and records the peak number of in-flight
/// requests it ever observed.
struct GaugedTranslator {
    inner: StubTranslator,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl GaugedTranslator {
    fn new(latency: Duration) -> Self {
        Self {
            inner: StubTranslator::new().with_latency(latency),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for GaugedTranslator {
    fn name(&self) -> &str {
        "gauged-stub"
    }

    async fn translate(
        &self,
        request: &TranslateRequest,
    ) -> Result<TranslationResult, TranslateError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);
        let outcome = self.inner.translate(request).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

async fn vocabulary_with(words: &[&str]) -> Arc<VocabularyService> {
    let entries: Vec<VocabularyEntry> = words
        .iter()
        .map(|word| VocabularyEntry::new(*word).with_tags(["cet6"]))
        .collect();
    let source = Arc::new(StaticSource::new().with_tagged_tier("core", entries));
    let service = VocabularyService::new(&CacheConfig::default());
    service.register(Arc::new(TaggedProvider::new(
        source,
        TaggedProviderConfig::default(),
    )));
    service
        .set_active_provider(
            "tagged",
            MatchOptions::default()
                .with_target_tags(["cet6"])
                .with_mode(TagMode::Any),
        )
        .await
        .expect("provider activation");
    Arc::new(service)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn enrichment_respects_the_concurrency_bound() {
    let words = [
        "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india",
        "juliett",
    ];
    let document = Arc::new(MemoryDocument::new());
    document.push_unit(words.join(" "));

    let vocabulary = vocabulary_with(&words).await;
    let translator = Arc::new(GaugedTranslator::new(Duration::from_millis(20)));
    let scanner = AnnotationScanner::new(
        document,
        vocabulary,
        translator.clone(),
        ScanConfig::default().with_max_concurrent_translations(3),
    )
    .expect("valid config");

    let result = scanner.scan().await;

    assert_eq!(result.status, ScanStatus::Completed);
    assert_eq!(result.annotations_applied, words.len());
    assert!(
        translator.peak() <= 3,
        "observed {} concurrent requests, bound is 3",
        translator.peak()
    );
    assert!(translator.peak() >= 2, "fan-out should actually happen");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn re_entrant_scan_skips_without_touching_the_document() {
    let document = Arc::new(MemoryDocument::new());
    document.push_unit("alpha bravo charlie");
    let before = document.render();

    let vocabulary = vocabulary_with(&["alpha", "bravo", "charlie"]).await;
    let translator = Arc::new(StubTranslator::new().with_latency(Duration::from_millis(120)));
    let scanner = Arc::new(
        AnnotationScanner::new(document.clone(), vocabulary, translator, ScanConfig::default())
            .expect("valid config"),
    );

    let background = {
        let scanner = scanner.clone();
        tokio::spawn(async move { scanner.scan().await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;

    let second = scanner.scan().await;
    assert_eq!(second.status, ScanStatus::AlreadyScanning);
    assert_eq!(second.text_units_scanned, 0);
    assert_eq!(document.render(), before, "skip must not mutate");

    let first = background.await.expect("first scan finishes");
    assert_eq!(first.status, ScanStatus::Completed);

    // The scanner is idle again afterwards.
    let third = scanner.remove_annotations();
    assert_eq!(third, 1);
    assert_eq!(document.render(), before);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn abort_leaves_a_terminal_result_and_an_untouched_document() {
    let document = Arc::new(MemoryDocument::new());
    document.push_unit("alpha bravo charlie delta echo");
    let before = document.render();

    let vocabulary = vocabulary_with(&["alpha", "bravo", "charlie", "delta", "echo"]).await;
    let translator = Arc::new(StubTranslator::new().with_latency(Duration::from_millis(80)));
    let scanner = Arc::new(
        AnnotationScanner::new(
            document.clone(),
            vocabulary,
            translator,
            ScanConfig::default().with_max_concurrent_translations(2),
        )
        .expect("valid config"),
    );

    let background = {
        let scanner = scanner.clone();
        tokio::spawn(async move { scanner.scan().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    scanner.abort();

    let result = background.await.expect("scan terminates");
    assert_eq!(result.status, ScanStatus::Completed);
    assert_eq!(result.annotations_applied, 0, "apply stage skipped");
    assert_eq!(document.render(), before);

    // A fresh scan afterwards works normally: the flag was per-scan.
    let rescan = scanner.scan().await;
    assert_eq!(rescan.status, ScanStatus::Completed);
    assert_eq!(rescan.annotations_applied, 5);
}
