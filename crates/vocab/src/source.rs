//! Vocabulary data sources.
//!
//! A [`VocabularySource`] hands providers their backing data one tier at a
//! time, so a provider can keep its startup cost bounded: the `core` tier is
//! loaded eagerly during `initialize`, heavier tiers only when asked for.
//! Loading is async because real sources sit behind files or HTTP.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::VocabError;
use crate::types::{normalize_word, VocabularyEntry};

/// Payload of one vocabulary tier.
#[derive(Debug, Clone)]
pub enum TierData {
    /// The unified schema: word → tags + frequency rank + star rating.
    Tagged(HashMap<String, VocabularyEntry>),
    /// The legacy schema: word → single ordinal level.
    Levels(HashMap<String, u32>),
}

impl TierData {
    pub fn len(&self) -> usize {
        match self {
            TierData::Tagged(entries) => entries.len(),
            TierData::Levels(levels) => levels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read-only tier loader implemented outside the engine.
#[async_trait]
pub trait VocabularySource: Send + Sync {
    /// Load one tier by name. A missing tier or transport failure is a
    /// [`VocabError::Load`]; providers treat that as fatal during
    /// `initialize`.
    async fn load_tier(&self, tier: &str) -> Result<TierData, VocabError>;
}

/// In-memory source for tests, demos, and embedded word lists.
///
/// Tier payloads are registered up front and cloned out on load. Words are
/// normalized on registration so lookups behave like a real source.
#[derive(Default)]
pub struct StaticSource {
    tiers: Mutex<HashMap<String, TierData>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tagged_tier<I>(self, tier: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = VocabularyEntry>,
    {
        let map: HashMap<String, VocabularyEntry> = entries
            .into_iter()
            .map(|entry| (normalize_word(&entry.word), entry))
            .collect();
        self.insert(tier.into(), TierData::Tagged(map));
        self
    }

    pub fn with_level_tier<I, S>(self, tier: impl Into<String>, levels: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let map: HashMap<String, u32> = levels
            .into_iter()
            .map(|(word, level)| (normalize_word(&word.into()), level))
            .collect();
        self.insert(tier.into(), TierData::Levels(map));
        self
    }

    fn insert(&self, tier: String, data: TierData) {
        self.tiers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(tier, data);
    }
}

#[async_trait]
impl VocabularySource for StaticSource {
    async fn load_tier(&self, tier: &str) -> Result<TierData, VocabError> {
        self.tiers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(tier)
            .cloned()
            .ok_or_else(|| VocabError::Load(format!("tier `{tier}` not found in static source")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_source_serves_registered_tiers() {
        let source = StaticSource::new()
            .with_tagged_tier("core", [VocabularyEntry::new("Apple").with_tags(["cet4"])])
            .with_level_tier("levels", [("banana", 2u32)]);

        match source.load_tier("core").await.expect("core tier") {
            TierData::Tagged(entries) => {
                assert!(entries.contains_key("apple"), "keys are normalized")
            }
            TierData::Levels(_) => panic!("core tier should be tagged"),
        }

        match source.load_tier("levels").await.expect("level tier") {
            TierData::Levels(levels) => assert_eq!(levels.get("banana"), Some(&2)),
            TierData::Tagged(_) => panic!("levels tier should be ordinal"),
        }
    }

    #[tokio::test]
    async fn missing_tier_is_a_load_error() {
        let source = StaticSource::new();
        let err = source.load_tier("advanced").await.expect_err("must fail");
        assert!(matches!(err, VocabError::Load(_)));
    }
}
