use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::VocabError;
use crate::types::{MatchOptions, VocabularyEntry};

/// Pluggable word-matching backend.
///
/// A provider decides whether a word deserves annotation under the caller's
/// [`MatchOptions`]. Implementations differ in what they know about a word:
/// tag sets, legacy ordinal levels, or corpus frequency ranks.
///
/// ## Lifecycle
///
/// `initialize` must complete before any match or metadata call; calling
/// early yields [`VocabError::NotInitialized`], never a silent `false`. A
/// failed `initialize` leaves the provider unusable and may be retried.
#[async_trait]
pub trait VocabularyProvider: Send + Sync {
    /// Stable identifier, used as the registry key and in cache keys.
    fn name(&self) -> &str;

    /// Load the provider's core data. Idempotent: a second call on an
    /// already-initialized provider is a no-op.
    async fn initialize(&self) -> Result<(), VocabError>;

    fn initialized(&self) -> bool;

    /// Whether `word` should be annotated under `options`. `word` may be in
    /// any casing; providers normalize internally.
    fn should_annotate(&self, word: &str, options: &MatchOptions) -> Result<bool, VocabError>;

    /// Bulk form of [`should_annotate`](Self::should_annotate), keyed by the
    /// input words. The default loops; implementations override to share a
    /// single lock acquisition across the batch.
    fn batch_check(
        &self,
        words: &[String],
        options: &MatchOptions,
    ) -> Result<HashMap<String, bool>, VocabError> {
        let mut results = HashMap::with_capacity(words.len());
        for word in words {
            results.insert(word.clone(), self.should_annotate(word, options)?);
        }
        Ok(results)
    }

    /// Entry metadata for `word`, `None` when unknown.
    fn metadata(&self, word: &str) -> Result<Option<VocabularyEntry>, VocabError>;

    /// Load an additional data tier on demand. Only meaningful for tiered
    /// providers; the default refuses.
    async fn load_tier(&self, _tier: &str) -> Result<(), VocabError> {
        Err(VocabError::TierUnsupported(self.name().to_string()))
    }
}
