//! Target persona list.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of personas a user can configure.
pub const MAX_PERSONAS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersonaError {
    #[error("persona list is full ({MAX_PERSONAS} max)")]
    Full,
    #[error("persona index {0} out of bounds")]
    OutOfBounds(usize),
    #[error("cannot remove the last remaining persona")]
    LastRemaining,
}

/// Ordered list of free-text persona descriptions.
///
/// Entries are free text and may be empty while being edited; only the
/// "active" subsequence (non-empty after trimming) participates in
/// planning. The list is bounded at [`MAX_PERSONAS`], keeps at least one
/// slot, and is never implicitly reordered, so a persona's display index
/// is stable across edits of other entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaList {
    entries: Vec<String>,
}

impl PersonaList {
    /// Build a list from initial entries, truncating past the bound.
    /// An empty input yields a single empty slot.
    #[must_use]
    pub fn new(entries: Vec<String>) -> Self {
        let mut entries = entries;
        entries.truncate(MAX_PERSONAS);
        if entries.is_empty() {
            entries.push(String::new());
        }
        Self { entries }
    }

    pub fn add(&mut self, value: impl Into<String>) -> Result<(), PersonaError> {
        if self.entries.len() >= MAX_PERSONAS {
            return Err(PersonaError::Full);
        }
        self.entries.push(value.into());
        Ok(())
    }

    pub fn edit(&mut self, index: usize, value: impl Into<String>) -> Result<(), PersonaError> {
        let slot = self
            .entries
            .get_mut(index)
            .ok_or(PersonaError::OutOfBounds(index))?;
        *slot = value.into();
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<(), PersonaError> {
        if self.entries.len() <= 1 {
            return Err(PersonaError::LastRemaining);
        }
        if index >= self.entries.len() {
            return Err(PersonaError::OutOfBounds(index));
        }
        self.entries.remove(index);
        Ok(())
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Active personas: entries with non-empty trimmed text, in order.
    ///
    /// The returned strings are trimmed. Persona indices used in planning
    /// index into this subsequence, not the raw entry list.
    #[must_use]
    pub fn active(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_list_keeps_one_slot() {
        let list = PersonaList::new(Vec::new());
        assert_eq!(list.len(), 1);
        assert!(list.active().is_empty());
    }

    #[test]
    fn add_rejects_past_bound() {
        let mut list = PersonaList::new(vec![String::from("a")]);
        for i in 1..MAX_PERSONAS {
            list.add(format!("p{i}")).unwrap();
        }
        assert_eq!(list.add("one too many"), Err(PersonaError::Full));
        assert_eq!(list.len(), MAX_PERSONAS);
    }

    #[test]
    fn remove_keeps_last_entry() {
        let mut list = PersonaList::new(vec![String::from("only")]);
        assert_eq!(list.remove(0), Err(PersonaError::LastRemaining));
    }

    #[test]
    fn remove_preserves_order() {
        let mut list = PersonaList::new(vec!["a".into(), "b".into(), "c".into()]);
        list.remove(1).unwrap();
        assert_eq!(list.entries(), ["a", "c"]);
    }

    #[test]
    fn active_skips_blank_entries_and_trims() {
        let list = PersonaList::new(vec![
            "  first  ".into(),
            String::new(),
            "   ".into(),
            "second".into(),
        ]);
        assert_eq!(list.active(), ["first", "second"]);
    }

    #[test]
    fn edit_out_of_bounds_is_rejected() {
        let mut list = PersonaList::new(vec!["a".into()]);
        assert_eq!(list.edit(3, "x"), Err(PersonaError::OutOfBounds(3)));
    }
}
