//! Row checkbox selection

use std::collections::HashSet;

/// Set of checked row ids.
///
/// Ids are kept as strings so the selection survives sorting and row
/// replacement.
#[derive(Debug, Clone, Default)]
pub struct RowSelection {
    selected: HashSet<String>,
}

impl RowSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected ids, sorted for deterministic ordering.
    pub fn selected(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Flips one id. Returns `true` if it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    /// Replaces the selection with exactly `ids`.
    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        self.selected = ids.into_iter().map(str::to_string).collect();
    }

    /// Clears the selection and returns the ids that were selected.
    pub fn clear(&mut self) -> Vec<String> {
        let mut removed: Vec<_> = self.selected.drain().collect();
        removed.sort();
        removed
    }

    /// Drops ids not in `existing`.
    pub fn retain_existing<'a>(&mut self, existing: impl IntoIterator<Item = &'a str>) {
        let existing: HashSet<&str> = existing.into_iter().collect();
        self.selected.retain(|id| existing.contains(id.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut selection = RowSelection::new();
        assert!(selection.toggle("a"));
        assert!(selection.is_selected("a"));
        assert!(!selection.toggle("a"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_all_and_clear() {
        let mut selection = RowSelection::new();
        selection.toggle("z");
        selection.select_all(["b", "a"]);

        assert_eq!(selection.selected(), vec!["a", "b"]);
        assert_eq!(selection.clear(), vec!["a", "b"]);
        assert_eq!(selection.len(), 0);
    }

    #[test]
    fn test_retain_existing() {
        let mut selection = RowSelection::new();
        selection.select_all(["a", "b", "c"]);
        selection.retain_existing(["b"]);
        assert_eq!(selection.selected(), vec!["b"]);
    }
}
