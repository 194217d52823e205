//! Cache-through facade over the provider family.
//!
//! The service owns a registry of providers, exactly one of which is active
//! at a time, plus the caller's [`MatchOptions`]. Match decisions are
//! memoized in a [`TtlCache`] keyed by (provider, options fingerprint,
//! normalized word); switching the provider or the options changes the
//! meaning of every cached key, so the swap clears the cache wholesale.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use cache::{CacheConfig, CacheStats, TtlCache};
use dashmap::DashMap;
use tracing::{debug, info};

use crate::error::VocabError;
use crate::provider::VocabularyProvider;
use crate::types::{normalize_word, MatchOptions, VocabularyEntry};

#[derive(Clone)]
struct ActiveState {
    name: String,
    provider: Arc<dyn VocabularyProvider>,
    options: MatchOptions,
    fingerprint: u64,
}

pub struct VocabularyService {
    providers: DashMap<String, Arc<dyn VocabularyProvider>>,
    active: RwLock<Option<ActiveState>>,
    decisions: TtlCache<String, bool>,
}

impl VocabularyService {
    pub fn new(cache_config: &CacheConfig) -> Self {
        Self {
            providers: DashMap::new(),
            active: RwLock::new(None),
            decisions: TtlCache::new(cache_config),
        }
    }

    /// Make a provider available under its own name. Registering does not
    /// initialize it; that happens lazily on activation.
    pub fn register(&self, provider: Arc<dyn VocabularyProvider>) {
        self.providers
            .insert(provider.name().to_string(), provider);
    }

    /// Activate `name` with `options`, initializing the provider on first
    /// use. Invalidates every memoized decision.
    pub async fn set_active_provider(
        &self,
        name: &str,
        options: MatchOptions,
    ) -> Result<(), VocabError> {
        let provider = self
            .providers
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| VocabError::UnknownProvider(name.to_string()))?;

        if !provider.initialized() {
            provider.initialize().await?;
        }

        let fingerprint = options.fingerprint();
        {
            let mut active = self
                .active
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *active = Some(ActiveState {
                name: name.to_string(),
                provider,
                options,
                fingerprint,
            });
        }
        self.decisions.clear();
        info!(provider = name, "vocabulary_provider_activated");
        Ok(())
    }

    /// Name of the active provider, if any.
    pub fn active_provider(&self) -> Option<String> {
        self.active
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map(|state| state.name.clone())
    }

    fn active_state(&self) -> Result<ActiveState, VocabError> {
        self.active
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .ok_or(VocabError::NoActiveProvider)
    }

    fn cache_key(state: &ActiveState, normalized: &str) -> String {
        format!("{}:{:016x}:{normalized}", state.name, state.fingerprint)
    }

    /// Cache-through single-word check.
    pub fn should_annotate(&self, word: &str) -> Result<bool, VocabError> {
        let state = self.active_state()?;
        let normalized = normalize_word(word);
        let key = Self::cache_key(&state, &normalized);

        if let Some(decision) = self.decisions.get(&key) {
            return Ok(decision);
        }
        let decision = state.provider.should_annotate(&normalized, &state.options)?;
        self.decisions.insert(key, decision);
        Ok(decision)
    }

    /// Cache-through bulk check. The result is keyed by normalized word;
    /// only cache misses reach the provider, in a single call.
    pub fn batch_check(&self, words: &[String]) -> Result<HashMap<String, bool>, VocabError> {
        let state = self.active_state()?;
        let mut results = HashMap::with_capacity(words.len());
        let mut misses = Vec::new();

        for word in words {
            let normalized = normalize_word(word);
            if results.contains_key(&normalized) {
                continue;
            }
            match self.decisions.get(&Self::cache_key(&state, &normalized)) {
                Some(decision) => {
                    results.insert(normalized, decision);
                }
                None => misses.push(normalized),
            }
        }

        if !misses.is_empty() {
            debug!(
                cached = results.len(),
                misses = misses.len(),
                "vocabulary_batch_check"
            );
            let fresh = state.provider.batch_check(&misses, &state.options)?;
            for (word, decision) in fresh {
                self.decisions
                    .insert(Self::cache_key(&state, &word), decision);
                results.insert(word, decision);
            }
        }

        Ok(results)
    }

    /// Metadata passthrough to the active provider (not memoized; entries
    /// are already a single map lookup away).
    pub fn metadata(&self, word: &str) -> Result<Option<VocabularyEntry>, VocabError> {
        let state = self.active_state()?;
        state.provider.metadata(word)
    }

    /// Load an additional tier on the active provider. New words change
    /// match results, so the memo cache is cleared on success.
    pub async fn load_tier(&self, tier: &str) -> Result<(), VocabError> {
        let state = self.active_state()?;
        state.provider.load_tier(tier).await?;
        self.decisions.clear();
        Ok(())
    }

    /// Counters of the decision memo cache.
    pub fn cache_stats(&self) -> CacheStats {
        self.decisions.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;
    use crate::tagged::{TaggedProvider, TaggedProviderConfig};
    use crate::types::TagMode;

    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_service() -> VocabularyService {
        let source = Arc::new(StaticSource::new().with_tagged_tier(
            "core",
            [
                VocabularyEntry::new("bridge").with_tags(["cet4", "cet6"]),
                VocabularyEntry::new("basic").with_tags(["cet4"]),
            ],
        ));
        let service = VocabularyService::new(&CacheConfig::default());
        service.register(Arc::new(TaggedProvider::new(
            source,
            TaggedProviderConfig::default(),
        )));
        service
    }

    fn cet6_options() -> MatchOptions {
        MatchOptions::default()
            .with_target_tags(["cet6"])
            .with_mode(TagMode::Any)
    }

    #[tokio::test]
    async fn no_active_provider_is_an_error() {
        let service = sample_service();
        let err = service.should_annotate("bridge").expect_err("inactive");
        assert_eq!(err, VocabError::NoActiveProvider);
    }

    #[tokio::test]
    async fn unknown_provider_rejected() {
        let service = sample_service();
        let err = service
            .set_active_provider("nope", MatchOptions::default())
            .await
            .expect_err("unknown");
        assert_eq!(err, VocabError::UnknownProvider("nope".into()));
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let service = sample_service();
        service
            .set_active_provider("tagged", cet6_options())
            .await
            .expect("activate");

        assert!(service.should_annotate("bridge").unwrap());
        assert!(service.should_annotate("bridge").unwrap());

        let stats = service.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn option_change_invalidates_cache() {
        let service = sample_service();
        service
            .set_active_provider("tagged", cet6_options())
            .await
            .expect("activate");
        assert!(service.should_annotate("bridge").unwrap());

        // Same provider, different options: previous decisions must not leak.
        service
            .set_active_provider(
                "tagged",
                MatchOptions::default()
                    .with_target_tags(["toefl"])
                    .with_mode(TagMode::Any),
            )
            .await
            .expect("re-activate");

        assert!(!service.should_annotate("bridge").unwrap());
        assert_eq!(service.cache_stats().hits, 0, "cache was cleared");
    }

    #[tokio::test]
    async fn batch_check_mixes_cache_and_provider() {
        let service = sample_service();
        service
            .set_active_provider("tagged", cet6_options())
            .await
            .expect("activate");

        assert!(service.should_annotate("bridge").unwrap());

        let words: Vec<String> = ["bridge", "basic", "missing", "Bridge"]
            .into_iter()
            .map(String::from)
            .collect();
        let results = service.batch_check(&words).expect("batch");

        // "Bridge" collapses onto "bridge" after normalization.
        assert_eq!(results.len(), 3);
        assert_eq!(results.get("bridge"), Some(&true));
        assert_eq!(results.get("basic"), Some(&false));
        assert_eq!(results.get("missing"), Some(&false));
    }

    #[tokio::test]
    async fn activation_initializes_provider_once() {
        struct CountingSource {
            inner: StaticSource,
            loads: AtomicUsize,
        }

        #[async_trait::async_trait]
        impl crate::source::VocabularySource for CountingSource {
            async fn load_tier(&self, tier: &str) -> Result<crate::source::TierData, VocabError> {
                self.loads.fetch_add(1, Ordering::SeqCst);
                self.inner.load_tier(tier).await
            }
        }

        let source = Arc::new(CountingSource {
            inner: StaticSource::new()
                .with_tagged_tier("core", [VocabularyEntry::new("bridge").with_tags(["cet6"])]),
            loads: AtomicUsize::new(0),
        });
        let service = VocabularyService::new(&CacheConfig::default());
        service.register(Arc::new(TaggedProvider::new(
            source.clone(),
            TaggedProviderConfig::default(),
        )));

        service
            .set_active_provider("tagged", cet6_options())
            .await
            .expect("first activation");
        service
            .set_active_provider("tagged", MatchOptions::default())
            .await
            .expect("second activation");

        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn metadata_passthrough() {
        let service = sample_service();
        service
            .set_active_provider("tagged", cet6_options())
            .await
            .expect("activate");

        let entry = service.metadata("bridge").unwrap().expect("known");
        assert!(entry.tags.contains("cet4"));
        assert!(service.metadata("missing").unwrap().is_none());
    }
}
