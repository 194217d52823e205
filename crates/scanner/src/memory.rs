//! In-memory document model for tests, demos, and embedded use.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::document::{DocumentModel, DocumentError, Fragment, UnitRef};

/// An ordered set of text spans with stable references.
///
/// Annotation fragments render as `word[annotation]`; real documents choose
/// their own rendering.
#[derive(Default)]
pub struct MemoryDocument {
    units: RwLock<Vec<(UnitRef, String)>>,
    next_id: AtomicUsize,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit and return its reference.
    pub fn push_unit(&self, content: impl Into<String>) -> UnitRef {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let unit = UnitRef::new(format!("unit-{id}"));
        self.write().push((unit.clone(), content.into()));
        unit
    }

    /// Remove a unit, simulating external document mutation.
    pub fn remove_unit(&self, unit: &UnitRef) -> bool {
        let mut units = self.write();
        let before = units.len();
        units.retain(|(existing, _)| existing != unit);
        units.len() != before
    }

    /// Overwrite a unit's content directly, bypassing fragment rendering.
    pub fn set_content(&self, unit: &UnitRef, content: impl Into<String>) -> bool {
        let mut units = self.write();
        match units.iter_mut().find(|(existing, _)| existing == unit) {
            Some((_, slot)) => {
                *slot = content.into();
                true
            }
            None => false,
        }
    }

    /// Full document text, units joined by newlines.
    pub fn render(&self) -> String {
        let units = self.read();
        units
            .iter()
            .map(|(_, content)| content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<(UnitRef, String)>> {
        self.units.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<(UnitRef, String)>> {
        self.units
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn render_fragments(fragments: &[Fragment]) -> String {
        let mut rendered = String::new();
        for fragment in fragments {
            match fragment {
                Fragment::Text(text) => rendered.push_str(text),
                Fragment::Annotation {
                    original,
                    annotation,
                } => {
                    rendered.push_str(original);
                    rendered.push('[');
                    rendered.push_str(annotation);
                    rendered.push(']');
                }
            }
        }
        rendered
    }
}

impl DocumentModel for MemoryDocument {
    fn text_units(&self) -> Vec<UnitRef> {
        self.read().iter().map(|(unit, _)| unit.clone()).collect()
    }

    fn unit_content(&self, unit: &UnitRef) -> Option<String> {
        self.read()
            .iter()
            .find(|(existing, _)| existing == unit)
            .map(|(_, content)| content.clone())
    }

    fn replace_unit(&self, unit: &UnitRef, fragments: &[Fragment]) -> Result<(), DocumentError> {
        let rendered = Self::render_fragments(fragments);
        let mut units = self.write();
        match units.iter_mut().find(|(existing, _)| existing == unit) {
            Some((_, slot)) => {
                *slot = rendered;
                Ok(())
            }
            None => Err(DocumentError::UnitMissing(unit.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_read_replace_roundtrip() {
        let doc = MemoryDocument::new();
        let unit = doc.push_unit("hello world");

        assert_eq!(doc.unit_content(&unit), Some("hello world".to_string()));
        assert!(doc.unit_exists(&unit));

        doc.replace_unit(
            &unit,
            &[
                Fragment::Text("hello ".into()),
                Fragment::Annotation {
                    original: "world".into(),
                    annotation: "世界".into(),
                },
            ],
        )
        .expect("unit exists");

        assert_eq!(doc.unit_content(&unit), Some("hello world[世界]".to_string()));
    }

    #[test]
    fn replacing_missing_unit_errors() {
        let doc = MemoryDocument::new();
        let unit = doc.push_unit("text");
        assert!(doc.remove_unit(&unit));

        let err = doc
            .replace_unit(&unit, &[Fragment::Text("x".into())])
            .expect_err("unit is gone");
        assert!(matches!(err, DocumentError::UnitMissing(_)));
    }

    #[test]
    fn units_keep_document_order() {
        let doc = MemoryDocument::new();
        let first = doc.push_unit("one");
        let second = doc.push_unit("two");

        assert_eq!(doc.text_units(), vec![first, second]);
        assert_eq!(doc.render(), "one\ntwo");
    }
}
