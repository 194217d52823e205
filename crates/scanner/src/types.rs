use std::sync::Arc;

use cache::CacheConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::UnitRef;

/// One occurrence of a word inside a text unit, captured at collect time.
///
/// `offset`/`length` are byte offsets into the unit's content as it was when
/// collected; the Apply stage re-validates them against the live content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordOccurrence {
    /// Original casing as it appears in the document.
    pub word: String,
    /// Trimmed, lowercased form used for matching and caching.
    pub normalized: String,
    pub unit: UnitRef,
    pub offset: usize,
    pub length: usize,
}

/// Configuration for one [`AnnotationScanner`](crate::AnnotationScanner).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanConfig {
    #[serde(default = "ScanConfig::default_source_lang")]
    pub source_lang: String,
    #[serde(default = "ScanConfig::default_target_lang")]
    pub target_lang: String,
    /// Bound on simultaneous outbound translation requests. Keeps the scan
    /// inside provider rate limits; excess work queues behind the bound.
    #[serde(default = "ScanConfig::default_max_concurrent_translations")]
    pub max_concurrent_translations: usize,
    /// Character budget for the context window sent with each request.
    #[serde(default = "ScanConfig::default_context_max_chars")]
    pub context_max_chars: usize,
    /// Sizing for the per-scanner translation memo cache.
    #[serde(default = "ScanConfig::default_translation_cache")]
    pub translation_cache: CacheConfig,
}

impl ScanConfig {
    pub(crate) fn default_source_lang() -> String {
        "en".to_string()
    }

    pub(crate) fn default_target_lang() -> String {
        "zh-CN".to_string()
    }

    pub(crate) fn default_max_concurrent_translations() -> usize {
        4
    }

    pub(crate) fn default_context_max_chars() -> usize {
        300
    }

    pub(crate) fn default_translation_cache() -> CacheConfig {
        CacheConfig::default()
            .with_max_entries(512)
            .with_default_ttl(std::time::Duration::from_secs(30 * 60))
    }

    pub fn with_languages(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source_lang = source.into();
        self.target_lang = target.into();
        self
    }

    pub fn with_max_concurrent_translations(mut self, bound: usize) -> Self {
        self.max_concurrent_translations = bound;
        self
    }

    pub fn with_context_max_chars(mut self, max_chars: usize) -> Self {
        self.context_max_chars = max_chars;
        self
    }

    /// Validate before constructing a scanner.
    pub fn validate(&self) -> Result<(), ScanConfigError> {
        if self.source_lang.trim().is_empty() {
            return Err(ScanConfigError::new("source_lang must not be empty"));
        }
        if self.target_lang.trim().is_empty() {
            return Err(ScanConfigError::new("target_lang must not be empty"));
        }
        if !(1..=16).contains(&self.max_concurrent_translations) {
            return Err(ScanConfigError::new(
                "max_concurrent_translations must be between 1 and 16",
            ));
        }
        if self.context_max_chars == 0 {
            return Err(ScanConfigError::new("context_max_chars must be positive"));
        }
        self.translation_cache
            .validate()
            .map_err(|err| ScanConfigError::new(err.to_string()))
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            source_lang: Self::default_source_lang(),
            target_lang: Self::default_target_lang(),
            max_concurrent_translations: Self::default_max_concurrent_translations(),
            context_max_chars: Self::default_context_max_chars(),
            translation_cache: Self::default_translation_cache(),
        }
    }
}

/// Rejected scanner configurations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid scan config: {message}")]
pub struct ScanConfigError {
    message: String,
}

impl ScanConfigError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Terminal outcome of one scan invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanStatus {
    Completed,
    /// Another scan was in flight; the document was left untouched.
    AlreadyScanning,
    /// The pipeline could not proceed (e.g. vocabulary not initialized).
    Failed { message: String },
}

/// One word whose enrichment failed; the rest of the batch continued.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanFailure {
    pub word: String,
    pub message: String,
}

/// Counters and failures for one scan pass. Created fresh per invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanResult {
    pub status: ScanStatus,
    pub text_units_scanned: usize,
    pub unique_words: usize,
    pub words_to_annotate: usize,
    pub annotations_applied: usize,
    /// Occurrences skipped defensively: unit gone or offsets stale.
    pub skipped_stale: usize,
    pub duration_ms: u64,
    pub errors: Vec<ScanFailure>,
}

impl ScanResult {
    pub(crate) fn empty(status: ScanStatus) -> Self {
        Self {
            status,
            text_units_scanned: 0,
            unique_words: 0,
            words_to_annotate: 0,
            annotations_applied: 0,
            skipped_stale: 0,
            duration_ms: 0,
            errors: Vec::new(),
        }
    }

    pub(crate) fn skipped() -> Self {
        Self::empty(ScanStatus::AlreadyScanning)
    }
}

/// Snapshot delivered after every enrichment unit completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanProgress {
    pub completed: usize,
    pub total: usize,
    pub current_word: String,
    pub errors: usize,
}

/// Observer invoked with progress snapshots during the Enrich stage.
pub type ProgressCallback = Arc<dyn Fn(ScanProgress) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = ScanConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.max_concurrent_translations, 4);
    }

    #[test]
    fn unbounded_concurrency_rejected() {
        let cfg = ScanConfig::default().with_max_concurrent_translations(0);
        assert!(cfg.validate().is_err());

        let cfg = ScanConfig::default().with_max_concurrent_translations(64);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_language_rejected() {
        let cfg = ScanConfig::default().with_languages("", "zh-CN");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&ScanStatus::AlreadyScanning).expect("serialize");
        assert!(json.contains("already_scanning"));
    }
}
