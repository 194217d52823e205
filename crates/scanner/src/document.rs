//! Document abstraction the scanner mutates.
//!
//! The engine never touches a concrete document format. It sees an
//! indexable collection of text units with stable references, reads their
//! content, and hands back replacement fragments — one atomic replace per
//! unit. How an annotation fragment is rendered is the document's business.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque, stable handle to one text unit (e.g. a text-run identifier).
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRef(String);

impl UnitRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One piece of a unit replacement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fragment {
    /// Plain text carried over unchanged.
    Text(String),
    /// An annotated word: the original occurrence plus its hint text.
    Annotation { original: String, annotation: String },
}

/// Errors reported by document implementations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("text unit `{0}` no longer exists")]
    UnitMissing(String),
    #[error("invalid replacement for unit `{0}`: {1}")]
    InvalidReplacement(String, String),
}

/// Read/replace access to a document's text units.
///
/// Implementations must be safe to read from concurrent enrichment workers;
/// mutation (`replace_unit`) is only ever issued from the single-threaded
/// Apply stage.
pub trait DocumentModel: Send + Sync {
    /// Stable references for every current text unit, in document order.
    fn text_units(&self) -> Vec<UnitRef>;

    /// Current content of a unit, `None` once the unit is gone.
    fn unit_content(&self, unit: &UnitRef) -> Option<String>;

    fn unit_exists(&self, unit: &UnitRef) -> bool {
        self.unit_content(unit).is_some()
    }

    /// Atomically replace a unit's content with the rendered fragments.
    fn replace_unit(&self, unit: &UnitRef, fragments: &[Fragment]) -> Result<(), DocumentError>;
}
