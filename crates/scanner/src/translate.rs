//! Translation capability boundary.
//!
//! Concrete providers (HTTP vendors, local dictionaries) live outside the
//! engine; the scanner only needs "translate this word, with this context".
//! Providers own their own timeouts and surface them as per-request errors.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One pronunciation rendering of a word.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Phonetic {
    /// The phonetic text, e.g. `ˈæp.əl`.
    pub text: String,
    /// Notation system, e.g. `ipa` or `pinyin`.
    pub notation: Option<String>,
}

/// One dictionary sense of a word.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Definition {
    pub part_of_speech: Option<String>,
    pub meaning: String,
}

/// Enrichment data produced once per (word, source, target) per scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslationResult {
    pub original_text: String,
    pub translated_text: String,
    pub source_lang: String,
    pub target_lang: String,
    #[serde(default)]
    pub phonetics: Vec<Phonetic>,
    #[serde(default)]
    pub definitions: Vec<Definition>,
    /// The compact text the scanner embeds into annotation fragments.
    pub annotation_text: String,
    pub provider: String,
    pub created_at: DateTime<Utc>,
}

/// A single translation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslateRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
    /// Sentence-bounded window around the occurrence, for disambiguation.
    pub context: Option<String>,
}

/// Per-request translation failures. All recoverable at scan level: the
/// word is skipped and the batch continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error("translation provider error: {0}")]
    Provider(String),
    #[error("translation request timed out: {0}")]
    Timeout(String),
    #[error("malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Pluggable translation backend, safe to invoke concurrently.
#[async_trait]
pub trait Translator: Send + Sync {
    fn name(&self) -> &str;

    async fn translate(&self, request: &TranslateRequest)
        -> Result<TranslationResult, TranslateError>;
}

/// Deterministic offline translator for tests and demos.
///
/// Produces a stable pseudo-translation for any input, optionally failing
/// for configured words or sleeping to simulate network latency.
#[derive(Default)]
pub struct StubTranslator {
    fail_words: HashSet<String>,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl StubTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every request for these words with a provider error.
    pub fn with_failures<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fail_words = words.into_iter().map(Into::into).collect();
        self
    }

    /// Sleep this long before answering each request.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of translate calls served so far (cache-bypass counter).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for StubTranslator {
    fn name(&self) -> &str {
        "stub"
    }

    async fn translate(
        &self,
        request: &TranslateRequest,
    ) -> Result<TranslationResult, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.fail_words.contains(&request.text) {
            return Err(TranslateError::Provider(format!(
                "stub failure for `{}`",
                request.text
            )));
        }

        let translated = format!("{}:{}", request.target_lang, request.text);
        Ok(TranslationResult {
            original_text: request.text.clone(),
            translated_text: translated.clone(),
            source_lang: request.source_lang.clone(),
            target_lang: request.target_lang.clone(),
            phonetics: vec![Phonetic {
                text: format!("/{}/", request.text),
                notation: Some("ipa".to_string()),
            }],
            definitions: Vec::new(),
            annotation_text: translated,
            provider: self.name().to_string(),
            created_at: Utc::now(),
        })
    }
}
