//! Active-note registries.
//!
//! The facade owns two of these: one for live voices, one for drones. Each
//! maps a note id to the render-path voice id currently bound to it and
//! enforces at-most-one entry per note.

use crate::types::NoteId;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct NoteRegistry {
    entries: HashMap<NoteId, u64>,
}

impl NoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, note: &NoteId) -> bool {
        self.entries.contains_key(note)
    }

    /// Register a voice for a note. Returns false (and changes nothing) if
    /// the note already has one - the double-trigger guard.
    pub fn insert(&mut self, note: NoteId, voice_id: u64) -> bool {
        if self.entries.contains_key(&note) {
            return false;
        }
        self.entries.insert(note, voice_id);
        true
    }

    /// Remove a note's entry, returning the voice id it was bound to
    pub fn remove(&mut self, note: &NoteId) -> Option<u64> {
        self.entries.remove(note)
    }

    /// Currently registered note ids, sorted for stable observation
    pub fn note_ids(&self) -> Vec<NoteId> {
        let mut ids: Vec<NoteId> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_guarded_per_note() {
        let mut registry = NoteRegistry::new();
        assert!(registry.insert(NoteId::from("C4"), 1));
        assert!(!registry.insert(NoteId::from("C4"), 2));
        assert_eq!(registry.len(), 1);
        // The original binding survives the rejected insert
        assert_eq!(registry.remove(&NoteId::from("C4")), Some(1));
    }

    #[test]
    fn test_remove_missing_is_none() {
        let mut registry = NoteRegistry::new();
        assert_eq!(registry.remove(&NoteId::from("G2")), None);
    }

    #[test]
    fn test_note_ids_sorted() {
        let mut registry = NoteRegistry::new();
        registry.insert(NoteId::from("E4"), 1);
        registry.insert(NoteId::from("A4"), 2);
        registry.insert(NoteId::from("C4"), 3);
        let ids: Vec<String> = registry
            .note_ids()
            .iter()
            .map(|n| n.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["A4", "C4", "E4"]);
    }
}
