//! Legacy ordinal tier provider.
//!
//! The old vocabulary schema assigns each word exactly one integer level.
//! Matching compares the word's level against a configured target level;
//! kept for callers still on level-based word lists.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::VocabError;
use crate::provider::VocabularyProvider;
use crate::source::{TierData, VocabularySource};
use crate::types::{normalize_word, MatchOptions, VocabularyEntry};

/// Comparison applied between a word's level and the target level.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TierMode {
    /// Annotate words at or above the target level.
    #[default]
    Above,
    /// Annotate words exactly at the target level.
    Exact,
    /// Annotate words at or below the target level.
    Below,
}

/// Configuration for [`OrdinalProvider`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrdinalProviderConfig {
    #[serde(default = "OrdinalProviderConfig::default_name")]
    pub name: String,
    /// Tier holding the legacy `word → level` map.
    #[serde(default = "OrdinalProviderConfig::default_tier")]
    pub tier: String,
    pub target_level: u32,
    #[serde(default)]
    pub mode: TierMode,
}

impl OrdinalProviderConfig {
    pub(crate) fn default_name() -> String {
        "ordinal".to_string()
    }

    pub(crate) fn default_tier() -> String {
        "levels".to_string()
    }

    pub fn new(target_level: u32, mode: TierMode) -> Self {
        Self {
            name: Self::default_name(),
            tier: Self::default_tier(),
            target_level,
            mode,
        }
    }
}

pub struct OrdinalProvider {
    config: OrdinalProviderConfig,
    source: Arc<dyn VocabularySource>,
    levels: RwLock<HashMap<String, u32>>,
    /// Lowest level seen at load time; the "base" tier excluded when
    /// `MatchOptions::include_base` is false.
    min_level: AtomicU32,
    ready: AtomicBool,
}

impl OrdinalProvider {
    pub fn new(source: Arc<dyn VocabularySource>, config: OrdinalProviderConfig) -> Self {
        Self {
            config,
            source,
            levels: RwLock::new(HashMap::new()),
            min_level: AtomicU32::new(u32::MAX),
            ready: AtomicBool::new(false),
        }
    }

    fn require_ready(&self) -> Result<(), VocabError> {
        if self.ready.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(VocabError::NotInitialized(self.config.name.clone()))
        }
    }

    fn decide(&self, level: u32, options: &MatchOptions) -> bool {
        if !options.include_base && level == self.min_level.load(Ordering::Relaxed) {
            return false;
        }
        match self.config.mode {
            TierMode::Above => level >= self.config.target_level,
            TierMode::Exact => level == self.config.target_level,
            TierMode::Below => level <= self.config.target_level,
        }
    }
}

#[async_trait]
impl VocabularyProvider for OrdinalProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn initialize(&self) -> Result<(), VocabError> {
        if self.ready.load(Ordering::Acquire) {
            return Ok(());
        }
        let data = self.source.load_tier(&self.config.tier).await?;
        let map = match data {
            TierData::Levels(levels) => levels,
            TierData::Tagged(_) => {
                return Err(VocabError::Schema {
                    tier: self.config.tier.clone(),
                    reason: "expected ordinal levels, got tagged entries".to_string(),
                })
            }
        };

        let min = map.values().copied().min().unwrap_or(u32::MAX);
        let count = map.len();
        {
            let mut levels = self
                .levels
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *levels = map
                .into_iter()
                .map(|(word, level)| (normalize_word(&word), level))
                .collect();
        }
        self.min_level.store(min, Ordering::Relaxed);
        self.ready.store(true, Ordering::Release);
        info!(provider = %self.config.name, words = count, "vocabulary_levels_loaded");
        Ok(())
    }

    fn initialized(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn should_annotate(&self, word: &str, options: &MatchOptions) -> Result<bool, VocabError> {
        self.require_ready()?;
        let levels = self
            .levels
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(levels
            .get(&normalize_word(word))
            .map(|&level| self.decide(level, options))
            .unwrap_or(false))
    }

    /// Levels surface as a synthetic `level-N` tag so callers see a uniform
    /// entry shape across providers.
    fn metadata(&self, word: &str) -> Result<Option<VocabularyEntry>, VocabError> {
        self.require_ready()?;
        let normalized = normalize_word(word);
        let levels = self
            .levels
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(levels.get(&normalized).map(|&level| VocabularyEntry {
            word: normalized.clone(),
            tags: BTreeSet::from([format!("level-{level}")]),
            frequency_rank: None,
            star_rating: 0,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;

    fn leveled_provider(target_level: u32, mode: TierMode) -> OrdinalProvider {
        let source = Arc::new(StaticSource::new().with_level_tier(
            "levels",
            [("easy", 1u32), ("medium", 2), ("hard", 3)],
        ));
        OrdinalProvider::new(source, OrdinalProviderConfig::new(target_level, mode))
    }

    #[tokio::test]
    async fn above_mode_matches_at_or_over_target() {
        let provider = leveled_provider(2, TierMode::Above);
        provider.initialize().await.expect("initialize");
        let options = MatchOptions::default().with_include_base(true);

        assert!(!provider.should_annotate("easy", &options).unwrap());
        assert!(provider.should_annotate("medium", &options).unwrap());
        assert!(provider.should_annotate("hard", &options).unwrap());
        assert!(!provider.should_annotate("unknown", &options).unwrap());
    }

    #[tokio::test]
    async fn below_and_exact_modes() {
        let below = leveled_provider(2, TierMode::Below);
        below.initialize().await.expect("initialize");
        let options = MatchOptions::default().with_include_base(true);

        assert!(below.should_annotate("easy", &options).unwrap());
        assert!(below.should_annotate("medium", &options).unwrap());
        assert!(!below.should_annotate("hard", &options).unwrap());

        let exact = leveled_provider(3, TierMode::Exact);
        exact.initialize().await.expect("initialize");
        assert!(!exact.should_annotate("medium", &options).unwrap());
        assert!(exact.should_annotate("hard", &options).unwrap());
    }

    #[tokio::test]
    async fn base_level_excluded_by_default() {
        let provider = leveled_provider(1, TierMode::Above);
        provider.initialize().await.expect("initialize");
        let options = MatchOptions::default();

        // "easy" sits at the lowest loaded level and include_base is false.
        assert!(!provider.should_annotate("easy", &options).unwrap());
        assert!(provider.should_annotate("medium", &options).unwrap());
    }

    #[tokio::test]
    async fn tagged_schema_is_rejected() {
        let source = Arc::new(StaticSource::new().with_tagged_tier(
            "levels",
            [VocabularyEntry::new("word").with_tags(["cet4"])],
        ));
        let provider =
            OrdinalProvider::new(source, OrdinalProviderConfig::new(1, TierMode::Above));
        let err = provider.initialize().await.expect_err("wrong schema");
        assert!(matches!(err, VocabError::Schema { .. }));
    }

    #[tokio::test]
    async fn metadata_exposes_level_as_tag() {
        let provider = leveled_provider(1, TierMode::Above);
        provider.initialize().await.expect("initialize");

        let entry = provider.metadata("hard").unwrap().expect("known word");
        assert!(entry.tags.contains("level-3"));
    }
}
