use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// One word in a loaded vocabulary layer. Immutable after loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VocabularyEntry {
    /// Normalized (trimmed, lowercased) word form.
    pub word: String,
    /// Certification/exam category labels, e.g. `cet6`, `toefl`.
    pub tags: BTreeSet<String>,
    /// Corpus frequency rank; lower means more common. `None` = unranked.
    pub frequency_rank: Option<u32>,
    /// Editorial importance rating, 0 through 5.
    pub star_rating: u8,
}

impl VocabularyEntry {
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: normalize_word(&word.into()),
            tags: BTreeSet::new(),
            frequency_rank: None,
            star_rating: 0,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_rank(mut self, rank: u32) -> Self {
        self.frequency_rank = Some(rank);
        self
    }

    /// Ratings outside 0..=5 are clamped at load time.
    pub fn with_star_rating(mut self, rating: u8) -> Self {
        self.star_rating = rating.min(5);
        self
    }
}

/// How `target_tags` are matched against an entry's tag set.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TagMode {
    /// Entry carries at least one of the target tags.
    #[default]
    Any,
    /// Entry carries every target tag (superset).
    All,
    /// Entry's tag set equals the target set exactly.
    Exact,
}

/// Caller-supplied matching policy.
///
/// Compared structurally: any change produces a different
/// [`fingerprint`](MatchOptions::fingerprint), which the service uses to
/// invalidate memoized decisions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchOptions {
    /// Tags a word must match to be annotated; empty means "any tagged word".
    #[serde(default)]
    pub target_tags: Vec<String>,
    #[serde(default)]
    pub mode: TagMode,
    /// When false, words carrying only base-tier tags are skipped.
    #[serde(default)]
    pub include_base: bool,
    /// Minimum star rating; 0 disables the filter.
    #[serde(default)]
    pub min_star_rating: u8,
}

impl MatchOptions {
    pub fn with_target_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mode(mut self, mode: TagMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_include_base(mut self, include_base: bool) -> Self {
        self.include_base = include_base;
        self
    }

    pub fn with_min_star_rating(mut self, rating: u8) -> Self {
        self.min_star_rating = rating;
        self
    }

    /// Stable, order-insensitive hash of the options, used in cache keys.
    pub fn fingerprint(&self) -> u64 {
        let mut tags: Vec<&str> = self.target_tags.iter().map(String::as_str).collect();
        tags.sort_unstable();
        tags.dedup();

        let mut hasher = fxhash::FxHasher::default();
        tags.hash(&mut hasher);
        (self.mode as u8).hash(&mut hasher);
        self.include_base.hash(&mut hasher);
        self.min_star_rating.hash(&mut hasher);
        hasher.finish()
    }
}

/// Canonical word form used across the engine: trimmed and lowercased.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_word("  Apple "), "apple");
        assert_eq!(normalize_word("HELLO"), "hello");
        assert_eq!(normalize_word("Café"), "café");
    }

    #[test]
    fn star_rating_clamped_to_five() {
        let entry = VocabularyEntry::new("word").with_star_rating(9);
        assert_eq!(entry.star_rating, 5);
    }

    #[test]
    fn fingerprint_ignores_tag_order_and_duplicates() {
        let a = MatchOptions::default().with_target_tags(["cet6", "toefl"]);
        let b = MatchOptions::default().with_target_tags(["toefl", "cet6", "toefl"]);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_changes_with_any_field() {
        let base = MatchOptions::default().with_target_tags(["cet6"]);
        assert_ne!(
            base.fingerprint(),
            base.clone().with_mode(TagMode::Exact).fingerprint()
        );
        assert_ne!(
            base.fingerprint(),
            base.clone().with_include_base(true).fingerprint()
        );
        assert_ne!(
            base.fingerprint(),
            base.clone().with_min_star_rating(3).fingerprint()
        );
        assert_ne!(
            base.fingerprint(),
            base.clone().with_target_tags(["gre"]).fingerprint()
        );
    }

    #[test]
    fn options_serde_roundtrip() {
        let options = MatchOptions::default()
            .with_target_tags(["cet6", "toefl"])
            .with_mode(TagMode::All)
            .with_min_star_rating(2);

        let json = serde_json::to_string(&options).expect("serialize");
        let back: MatchOptions = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(options, back);
    }
}
