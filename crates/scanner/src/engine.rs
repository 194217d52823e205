use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use cache::TtlCache;
use context::extract_context;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use vocab::VocabularyService;

use crate::document::{DocumentModel, Fragment, UnitRef};
use crate::translate::{TranslateError, TranslateRequest, TranslationResult, Translator};
use crate::types::{
    ProgressCallback, ScanConfig, ScanConfigError, ScanFailure, ScanProgress, ScanResult,
    ScanStatus, WordOccurrence,
};
use crate::words::extract_words;


const PHASE_IDLE: u8 = 0;
const PHASE_SCANNING: u8 = 1;
const PHASE_ENRICHING: u8 = 2;
const PHASE_APPLYING: u8 = 3;

/// Resets the scanner to `Idle` on every exit path of a scan.
struct PhaseGuard<'a>(&'a AtomicU8);

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.0.store(PHASE_IDLE, Ordering::Release);
    }
}

/// Drives the collect → match → enrich → apply pipeline over one document.
///
/// One logical pipeline per instance: a `scan` issued while another is in
/// flight returns [`ScanStatus::AlreadyScanning`] immediately instead of
/// queueing. Only the Enrich stage fans out, bounded by
/// [`ScanConfig::max_concurrent_translations`].
pub struct AnnotationScanner {
    document: Arc<dyn DocumentModel>,
    vocabulary: Arc<VocabularyService>,
    translator: Arc<dyn Translator>,
    config: ScanConfig,
    phase: AtomicU8,
    abort: Arc<AtomicBool>,
    translations: TtlCache<String, TranslationResult>,
    /// Pre-annotation content per unit this scanner has touched. Doubles as
    /// the exclusion set for re-scans and feeds `remove_annotations`.
    originals: Mutex<HashMap<UnitRef, String>>,
    progress: RwLock<Option<ProgressCallback>>,
}

impl std::fmt::Debug for AnnotationScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationScanner")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("abort", &self.abort)
            .finish_non_exhaustive()
    }
}

impl AnnotationScanner {
    /// Construction fails fast on an invalid configuration; collaborators
    /// are required up front rather than probed for at call time.
    pub fn new(
        document: Arc<dyn DocumentModel>,
        vocabulary: Arc<VocabularyService>,
        translator: Arc<dyn Translator>,
        config: ScanConfig,
    ) -> Result<Self, ScanConfigError> {
        config.validate()?;
        let translations = TtlCache::new(&config.translation_cache);
        Ok(Self {
            document,
            vocabulary,
            translator,
            config,
            phase: AtomicU8::new(PHASE_IDLE),
            abort: Arc::new(AtomicBool::new(false)),
            translations,
            originals: Mutex::new(HashMap::new()),
            progress: RwLock::new(None),
        })
    }

    /// Install a progress observer, invoked after every enrichment unit.
    pub fn on_progress(&self, callback: ProgressCallback) {
        *self
            .progress
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(callback);
    }

    /// Cooperative cancellation: no new translation requests are started and
    /// the Apply stage is skipped. In-flight requests complete and their
    /// results are discarded. Cleared at the start of the next scan.
    pub fn abort(&self) {
        self.abort.store(true, Ordering::Release);
    }

    /// Units currently tracked as annotated by this scanner.
    pub fn annotated_units(&self) -> usize {
        self.lock_originals().len()
    }

    /// Scan the whole document.
    pub async fn scan(&self) -> ScanResult {
        self.scan_filtered(|_| false).await
    }

    /// Scan with a caller-supplied exclusion predicate; units for which it
    /// returns `true` are not collected (already-annotated units are always
    /// excluded).
    pub async fn scan_filtered<F>(&self, exclude: F) -> ScanResult
    where
        F: Fn(&UnitRef) -> bool + Send,
    {
        if self
            .phase
            .compare_exchange(
                PHASE_IDLE,
                PHASE_SCANNING,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            debug!("scan_rejected_already_running");
            return ScanResult::skipped();
        }
        let _phase = PhaseGuard(&self.phase);
        self.abort.store(false, Ordering::Release);
        let start = Instant::now();

        // Collect.
        let (units_scanned, occurrences) = self.collect(&exclude);
        let unique_words = occurrences.len();
        info!(units_scanned, unique_words, "scan_collected");

        // Match.
        let mut queries: Vec<String> = occurrences.keys().cloned().collect();
        queries.sort_unstable();
        let to_annotate = match self.vocabulary.batch_check(&queries) {
            Ok(decisions) => queries
                .into_iter()
                .filter(|word| decisions.get(word).copied().unwrap_or(false))
                .collect::<Vec<String>>(),
            Err(err) => {
                warn!(error = %err, "scan_match_failed");
                let mut result = ScanResult::empty(ScanStatus::Failed {
                    message: err.to_string(),
                });
                result.text_units_scanned = units_scanned;
                result.unique_words = unique_words;
                result.duration_ms = start.elapsed().as_millis() as u64;
                return result;
            }
        };
        info!(words_to_annotate = to_annotate.len(), "scan_matched");

        // Enrich.
        self.phase.store(PHASE_ENRICHING, Ordering::Release);
        let (translations, errors) = self.enrich(&to_annotate, &occurrences).await;

        // Apply.
        self.phase.store(PHASE_APPLYING, Ordering::Release);
        let (annotations_applied, skipped_stale) = if self.abort.load(Ordering::Acquire) {
            debug!("scan_apply_skipped_after_abort");
            (0, 0)
        } else {
            self.apply(&to_annotate, &occurrences, &translations)
        };

        let result = ScanResult {
            status: ScanStatus::Completed,
            text_units_scanned: units_scanned,
            unique_words,
            words_to_annotate: to_annotate.len(),
            annotations_applied,
            skipped_stale,
            duration_ms: start.elapsed().as_millis() as u64,
            errors,
        };
        info!(
            annotations_applied,
            skipped_stale,
            errors = result.errors.len(),
            duration_ms = result.duration_ms,
            "scan_complete"
        );
        result
    }

    /// Restore the original content of every tracked unit still present and
    /// clear the tracking set. Idempotent: a second call removes nothing.
    pub fn remove_annotations(&self) -> usize {
        let tracked: Vec<(UnitRef, String)> = self.lock_originals().drain().collect();
        let mut removed = 0;
        for (unit, original) in tracked {
            if !self.document.unit_exists(&unit) {
                continue;
            }
            match self
                .document
                .replace_unit(&unit, &[Fragment::Text(original)])
            {
                Ok(()) => removed += 1,
                Err(err) => warn!(unit = %unit, error = %err, "annotation_restore_failed"),
            }
        }
        if removed > 0 {
            info!(removed, "annotations_removed");
        }
        removed
    }

    fn lock_originals(&self) -> std::sync::MutexGuard<'_, HashMap<UnitRef, String>> {
        self.originals
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit_progress(&self, completed: usize, total: usize, current_word: &str, errors: usize) {
        let callback = self
            .progress
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        if let Some(callback) = callback {
            callback(ScanProgress {
                completed,
                total,
                current_word: current_word.to_string(),
                errors,
            });
        }
    }

    /// Walk the document and group word occurrences by normalized form.
    /// All occurrences for a unit are captured before any mutation happens;
    /// mutation only occurs later, in Apply.
    fn collect<F>(&self, exclude: &F) -> (usize, HashMap<String, Vec<WordOccurrence>>)
    where
        F: Fn(&UnitRef) -> bool,
    {
        let mut occurrences: HashMap<String, Vec<WordOccurrence>> = HashMap::new();
        let mut units_scanned = 0;

        for unit in self.document.text_units() {
            if exclude(&unit) || self.lock_originals().contains_key(&unit) {
                continue;
            }
            let Some(content) = self.document.unit_content(&unit) else {
                continue;
            };
            units_scanned += 1;
            for raw in extract_words(&content) {
                let normalized = raw.text.to_lowercase();
                occurrences
                    .entry(normalized.clone())
                    .or_default()
                    .push(WordOccurrence {
                        word: raw.text,
                        normalized,
                        unit: unit.clone(),
                        offset: raw.start,
                        length: raw.end - raw.start,
                    });
            }
        }

        (units_scanned, occurrences)
    }

    /// Fan out translation requests under the concurrency bound. One word's
    /// failure never aborts the batch; progress is reported per completion.
    async fn enrich(
        &self,
        to_annotate: &[String],
        occurrences: &HashMap<String, Vec<WordOccurrence>>,
    ) -> (HashMap<String, TranslationResult>, Vec<ScanFailure>) {
        let total = to_annotate.len();
        let mut translations: HashMap<String, TranslationResult> = HashMap::new();
        let mut errors: Vec<ScanFailure> = Vec::new();
        let mut completed = 0;

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_translations));
        let mut workers: JoinSet<(
            String,
            Option<Result<TranslationResult, TranslateError>>,
        )> = JoinSet::new();

        for word in to_annotate {
            if self.abort.load(Ordering::Acquire) {
                break;
            }

            // Served from a previous scan of the same language pair.
            if let Some(hit) = self.translations.get(&self.translation_key(word)) {
                translations.insert(word.clone(), hit);
                completed += 1;
                self.emit_progress(completed, total, word, errors.len());
                continue;
            }

            let request = TranslateRequest {
                text: word.clone(),
                source_lang: self.config.source_lang.clone(),
                target_lang: self.config.target_lang.clone(),
                context: self.context_for(word, occurrences),
            };
            let translator = self.translator.clone();
            let semaphore = semaphore.clone();
            let abort = self.abort.clone();
            let word = word.clone();
            workers.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (word, None);
                };
                // Checked after queueing behind the bound so an abort stops
                // the tail of the batch, not just undispatched words.
                if abort.load(Ordering::Acquire) {
                    return (word, None);
                }
                let outcome = translator.translate(&request).await;
                (word, Some(outcome))
            });
        }

        while let Some(joined) = workers.join_next().await {
            let Ok((word, outcome)) = joined else {
                warn!("translation_worker_panicked");
                continue;
            };
            match outcome {
                Some(Ok(result)) => {
                    self.translations
                        .insert(self.translation_key(&word), result.clone());
                    translations.insert(word.clone(), result);
                }
                Some(Err(err)) => {
                    warn!(word = %word, error = %err, "translation_failed");
                    errors.push(ScanFailure {
                        word: word.clone(),
                        message: err.to_string(),
                    });
                }
                // Aborted before dispatch; discarded silently.
                None => {}
            }
            completed += 1;
            self.emit_progress(completed, total, &word, errors.len());
        }

        (translations, errors)
    }

    /// Context window from the word's first occurrence, read against the
    /// unit's current content.
    fn context_for(
        &self,
        word: &str,
        occurrences: &HashMap<String, Vec<WordOccurrence>>,
    ) -> Option<String> {
        let first = occurrences.get(word)?.first()?;
        let content = self.document.unit_content(&first.unit)?;
        Some(extract_context(
            &content,
            &first.word,
            first.offset,
            self.config.context_max_chars,
        ))
    }

    /// Splice annotations into each affected unit, last occurrence first so
    /// earlier offsets stay valid, then hand the document one atomic
    /// replacement per unit.
    fn apply(
        &self,
        to_annotate: &[String],
        occurrences: &HashMap<String, Vec<WordOccurrence>>,
        translations: &HashMap<String, TranslationResult>,
    ) -> (usize, usize) {
        let mut per_unit: HashMap<UnitRef, Vec<&WordOccurrence>> = HashMap::new();
        for word in to_annotate {
            if !translations.contains_key(word) {
                continue;
            }
            for occurrence in occurrences.get(word).map(Vec::as_slice).unwrap_or(&[]) {
                per_unit
                    .entry(occurrence.unit.clone())
                    .or_default()
                    .push(occurrence);
            }
        }

        let mut annotations_applied = 0;
        let mut skipped_stale = 0;

        for (unit, mut unit_occurrences) in per_unit {
            if !self.document.unit_exists(&unit) {
                skipped_stale += unit_occurrences.len();
                continue;
            }
            let Some(content) = self.document.unit_content(&unit) else {
                skipped_stale += unit_occurrences.len();
                continue;
            };

            unit_occurrences.sort_by(|a, b| b.offset.cmp(&a.offset));

            // Build the fragment list back to front; `cut` walks left from
            // the end of the unit toward offset zero.
            let mut fragments: Vec<Fragment> = Vec::new();
            let mut cut = content.len();
            let mut applied_here = 0;

            for occurrence in unit_occurrences {
                let end = occurrence.offset + occurrence.length;
                let intact = end <= cut
                    && content.is_char_boundary(occurrence.offset)
                    && content.is_char_boundary(end)
                    && content[occurrence.offset..end] == occurrence.word;
                if !intact {
                    skipped_stale += 1;
                    continue;
                }
                let Some(result) = translations.get(&occurrence.normalized) else {
                    continue;
                };
                if end < cut {
                    fragments.push(Fragment::Text(content[end..cut].to_string()));
                }
                fragments.push(Fragment::Annotation {
                    original: occurrence.word.clone(),
                    annotation: result.annotation_text.clone(),
                });
                cut = occurrence.offset;
                applied_here += 1;
            }

            if applied_here == 0 {
                continue;
            }
            if cut > 0 {
                fragments.push(Fragment::Text(content[..cut].to_string()));
            }
            fragments.reverse();

            self.lock_originals().insert(unit.clone(), content.clone());
            match self.document.replace_unit(&unit, &fragments) {
                Ok(()) => annotations_applied += applied_here,
                Err(err) => {
                    warn!(unit = %unit, error = %err, "unit_replace_failed");
                    self.lock_originals().remove(&unit);
                    skipped_stale += applied_here;
                }
            }
        }

        (annotations_applied, skipped_stale)
    }

    fn translation_key(&self, word: &str) -> String {
        format!(
            "{word}:{}:{}",
            self.config.source_lang, self.config.target_lang
        )
    }
}
