//! Unified tag-based provider.
//!
//! Words carry tag sets, frequency ranks, and star ratings, loaded in tiers:
//! the `core` tier eagerly during `initialize`, heavier tiers (e.g.
//! `advanced`) on demand via `load_tier`. Loaded entries are never mutated.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::VocabError;
use crate::provider::VocabularyProvider;
use crate::source::{TierData, VocabularySource};
use crate::types::{normalize_word, MatchOptions, TagMode, VocabularyEntry};

/// Configuration for [`TaggedProvider`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaggedProviderConfig {
    /// Registry name for this provider instance.
    #[serde(default = "TaggedProviderConfig::default_name")]
    pub name: String,
    /// Tier loaded eagerly by `initialize`.
    #[serde(default = "TaggedProviderConfig::default_core_tier")]
    pub core_tier: String,
    /// Tags forming the lowest certification tier. A word carrying only
    /// these is skipped unless `MatchOptions::include_base` is set.
    #[serde(default = "TaggedProviderConfig::default_base_tags")]
    pub base_tags: BTreeSet<String>,
}

impl TaggedProviderConfig {
    pub(crate) fn default_name() -> String {
        "tagged".to_string()
    }

    pub(crate) fn default_core_tier() -> String {
        "core".to_string()
    }

    pub(crate) fn default_base_tags() -> BTreeSet<String> {
        BTreeSet::from(["cet4".to_string()])
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_base_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for TaggedProviderConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            core_tier: Self::default_core_tier(),
            base_tags: Self::default_base_tags(),
        }
    }
}

pub struct TaggedProvider {
    config: TaggedProviderConfig,
    source: Arc<dyn VocabularySource>,
    entries: RwLock<HashMap<String, VocabularyEntry>>,
    loaded_tiers: RwLock<HashSet<String>>,
    ready: AtomicBool,
}

impl TaggedProvider {
    pub fn new(source: Arc<dyn VocabularySource>, config: TaggedProviderConfig) -> Self {
        Self {
            config,
            source,
            entries: RwLock::new(HashMap::new()),
            loaded_tiers: RwLock::new(HashSet::new()),
            ready: AtomicBool::new(false),
        }
    }

    /// Number of words across all loaded tiers.
    pub fn word_count(&self) -> usize {
        self.read_entries().len()
    }

    fn read_entries(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, VocabularyEntry>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn require_ready(&self) -> Result<(), VocabError> {
        if self.ready.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(VocabError::NotInitialized(self.config.name.clone()))
        }
    }

    async fn merge_tier(&self, tier: &str) -> Result<(), VocabError> {
        let already = {
            let tiers = self
                .loaded_tiers
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            tiers.contains(tier)
        };
        if already {
            return Ok(());
        }

        let data = self.source.load_tier(tier).await?;
        let loaded = match data {
            TierData::Tagged(tagged) => {
                let mut entries = self
                    .entries
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                let count = tagged.len();
                for (word, entry) in tagged {
                    entries.insert(normalize_word(&word), entry);
                }
                count
            }
            TierData::Levels(_) => {
                return Err(VocabError::Schema {
                    tier: tier.to_string(),
                    reason: "expected tagged entries, got ordinal levels".to_string(),
                })
            }
        };

        self.loaded_tiers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(tier.to_string());
        info!(provider = %self.config.name, tier, words = loaded, "vocabulary_tier_loaded");
        Ok(())
    }

    fn decide(&self, entry: &VocabularyEntry, options: &MatchOptions) -> bool {
        if options.min_star_rating > 0 && entry.star_rating < options.min_star_rating {
            return false;
        }
        if options.target_tags.is_empty() {
            return !entry.tags.is_empty();
        }
        if !options.include_base
            && entry
                .tags
                .iter()
                .all(|tag| self.config.base_tags.contains(tag))
        {
            return false;
        }

        let target: BTreeSet<&str> = options.target_tags.iter().map(String::as_str).collect();
        match options.mode {
            TagMode::Any => entry.tags.iter().any(|tag| target.contains(tag.as_str())),
            TagMode::All => target.iter().all(|tag| entry.tags.contains(*tag)),
            TagMode::Exact => {
                entry.tags.len() == target.len()
                    && entry.tags.iter().all(|tag| target.contains(tag.as_str()))
            }
        }
    }
}

#[async_trait]
impl VocabularyProvider for TaggedProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn initialize(&self) -> Result<(), VocabError> {
        if self.ready.load(Ordering::Acquire) {
            return Ok(());
        }
        let core_tier = self.config.core_tier.clone();
        self.merge_tier(&core_tier).await?;
        self.ready.store(true, Ordering::Release);
        Ok(())
    }

    fn initialized(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn should_annotate(&self, word: &str, options: &MatchOptions) -> Result<bool, VocabError> {
        self.require_ready()?;
        let normalized = normalize_word(word);
        let entries = self.read_entries();
        Ok(entries
            .get(&normalized)
            .map(|entry| self.decide(entry, options))
            .unwrap_or(false))
    }

    fn batch_check(
        &self,
        words: &[String],
        options: &MatchOptions,
    ) -> Result<HashMap<String, bool>, VocabError> {
        self.require_ready()?;
        let entries = self.read_entries();
        let mut results = HashMap::with_capacity(words.len());
        for word in words {
            let decision = entries
                .get(&normalize_word(word))
                .map(|entry| self.decide(entry, options))
                .unwrap_or(false);
            results.insert(word.clone(), decision);
        }
        Ok(results)
    }

    fn metadata(&self, word: &str) -> Result<Option<VocabularyEntry>, VocabError> {
        self.require_ready()?;
        Ok(self.read_entries().get(&normalize_word(word)).cloned())
    }

    async fn load_tier(&self, tier: &str) -> Result<(), VocabError> {
        self.require_ready()?;
        self.merge_tier(tier).await
    }
}
