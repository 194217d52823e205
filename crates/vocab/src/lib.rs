//! LEXGLOSS vocabulary layer.
//!
//! Decides which words deserve annotation. Three provider variants share one
//! object-safe trait:
//!
//! - [`TaggedProvider`] — the unified schema: tag sets, frequency ranks, and
//!   star ratings, loaded in tiers (`core` eagerly, heavier tiers on demand)
//! - [`OrdinalProvider`] — the legacy schema: one integer level per word
//! - [`FrequencyProvider`] — corpus frequency ranks with a threshold
//!
//! [`VocabularyService`] sits on top: it owns the provider registry and the
//! active [`MatchOptions`], and memoizes decisions in the shared cache layer
//! keyed by (provider, options fingerprint, normalized word). Swapping the
//! provider or the options invalidates the whole memo.
//!
//! Data enters through a [`VocabularySource`], an async tier loader
//! implemented by the host application; [`StaticSource`] ships for tests and
//! embedded word lists.

mod error;
mod frequency;
mod ordinal;
mod provider;
mod service;
mod source;
mod tagged;
mod types;

pub use crate::error::VocabError;
pub use crate::frequency::{FrequencyProvider, FrequencyProviderConfig, RankMode};
pub use crate::ordinal::{OrdinalProvider, OrdinalProviderConfig, TierMode};
pub use crate::provider::VocabularyProvider;
pub use crate::service::VocabularyService;
pub use crate::source::{StaticSource, TierData, VocabularySource};
pub use crate::tagged::{TaggedProvider, TaggedProviderConfig};
pub use crate::types::{normalize_word, MatchOptions, TagMode, VocabularyEntry};
