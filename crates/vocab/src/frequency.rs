//! Frequency-rank provider.
//!
//! Annotation decisions come from corpus frequency: low rank numbers are
//! common words, high rank numbers are rare ones. Words with no known rank
//! are treated as rare and annotated — the opposite default from the tagged
//! provider, preserved deliberately (see DESIGN.md).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::VocabError;
use crate::provider::VocabularyProvider;
use crate::source::{TierData, VocabularySource};
use crate::types::{normalize_word, MatchOptions, VocabularyEntry};

/// Which side of the threshold gets annotated.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RankMode {
    /// Annotate words rarer than the threshold (`rank > threshold`).
    #[default]
    Below,
    /// Annotate words more common than the threshold (`rank < threshold`).
    Above,
}

/// Configuration for [`FrequencyProvider`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrequencyProviderConfig {
    #[serde(default = "FrequencyProviderConfig::default_name")]
    pub name: String,
    /// Tier holding ranked entries (unified schema).
    #[serde(default = "FrequencyProviderConfig::default_tier")]
    pub tier: String,
    #[serde(default = "FrequencyProviderConfig::default_threshold")]
    pub threshold: u32,
    #[serde(default)]
    pub mode: RankMode,
}

impl FrequencyProviderConfig {
    pub(crate) fn default_name() -> String {
        "frequency".to_string()
    }

    pub(crate) fn default_tier() -> String {
        "core".to_string()
    }

    pub(crate) fn default_threshold() -> u32 {
        5000
    }

    pub fn new(threshold: u32, mode: RankMode) -> Self {
        Self {
            name: Self::default_name(),
            tier: Self::default_tier(),
            threshold,
            mode,
        }
    }
}

impl Default for FrequencyProviderConfig {
    fn default() -> Self {
        Self::new(Self::default_threshold(), RankMode::default())
    }
}

pub struct FrequencyProvider {
    config: FrequencyProviderConfig,
    source: Arc<dyn VocabularySource>,
    entries: RwLock<HashMap<String, VocabularyEntry>>,
    ready: AtomicBool,
}

impl FrequencyProvider {
    pub fn new(source: Arc<dyn VocabularySource>, config: FrequencyProviderConfig) -> Self {
        Self {
            config,
            source,
            entries: RwLock::new(HashMap::new()),
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

    fn decide(&self, rank: Option<u32>) -> bool {
        match rank {
            // Unranked words are treated as rare: annotate.
            None => true,
            Some(rank) => match self.config.mode {
                RankMode::Below => rank > self.config.threshold,
                RankMode::Above => rank < self.config.threshold,
            },
        }
    }
}

#[async_trait]
impl VocabularyProvider for FrequencyProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn initialize(&self) -> Result<(), VocabError> {
        if self.ready.load(Ordering::Acquire) {
            return Ok(());
        }
        let data = self.source.load_tier(&self.config.tier).await?;
        let map = match data {
            TierData::Tagged(entries) => entries,
            TierData::Levels(_) => {
                return Err(VocabError::Schema {
                    tier: self.config.tier.clone(),
                    reason: "expected ranked entries, got ordinal levels".to_string(),
                })
            }
        };

        let count = map.len();
        {
            let mut entries = self
                .entries
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *entries = map
                .into_iter()
                .map(|(word, entry)| (normalize_word(&word), entry))
                .collect();
        }
        self.ready.store(true, Ordering::Release);
        info!(provider = %self.config.name, words = count, "vocabulary_ranks_loaded");
        Ok(())
    }

    fn initialized(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn should_annotate(&self, word: &str, _options: &MatchOptions) -> Result<bool, VocabError> {
        self.require_ready()?;
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let rank = entries
            .get(&normalize_word(word))
            .and_then(|entry| entry.frequency_rank);
        Ok(self.decide(rank))
    }

    fn metadata(&self, word: &str) -> Result<Option<VocabularyEntry>, VocabError> {
        self.require_ready()?;
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(entries.get(&normalize_word(word)).cloned())
    }
}
