//! Toggle-set over entity identifiers.
//!
//! One abstraction serves every bulk operation: choosing personas to generate
//! notes for, and choosing personas to delete.

use std::collections::BTreeSet;

/// Set of chosen ids with toggle semantics.
///
/// Operations are total: any id can be toggled, including ids that do not
/// exist in the backing collection. Use [`SelectionSet::retain_known`] to drop
/// those when it matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSet<T: Ord> {
    ids: BTreeSet<T>,
    revision: u64,
}

impl<T: Ord> Default for SelectionSet<T> {
    fn default() -> Self {
        Self {
            ids: BTreeSet::new(),
            revision: 0,
        }
    }
}

impl<T: Ord + Clone> SelectionSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`, returning whether it is now selected.
    pub fn toggle(&mut self, id: T) -> bool {
        self.revision += 1;
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn is_selected(&self, id: &T) -> bool {
        self.ids.contains(id)
    }

    pub fn clear(&mut self) {
        if !self.ids.is_empty() {
            self.ids.clear();
            self.revision += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.ids.iter()
    }

    /// Bumped on every membership change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drop selected ids that are not in `known`.
    pub fn retain_known<'a, I>(&mut self, known: I)
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let known: BTreeSet<&T> = known.into_iter().collect();
        let before = self.ids.len();
        self.ids.retain(|id| known.contains(id));
        if self.ids.len() != before {
            self.revision += 1;
        }
    }

    /// Items whose key is selected, in collection order.
    pub fn filter<'a, E, F>(&self, items: &'a [E], key: F) -> Vec<&'a E>
    where
        F: Fn(&E) -> &T,
    {
        items.iter().filter(|item| self.ids.contains(key(*item))).collect()
    }
}

impl<T: Ord + Clone> FromIterator<T> for SelectionSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let ids: BTreeSet<T> = iter.into_iter().collect();
        Self { ids, revision: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_membership_follows_parity() {
        let sequence = ["a", "b", "a", "c", "a", "b", "c", "c"];
        let mut set = SelectionSet::new();
        for id in sequence {
            set.toggle(id.to_string());
        }

        for id in ["a", "b", "c"] {
            let toggles = sequence.iter().filter(|s| **s == id).count();
            assert_eq!(set.is_selected(&id.to_string()), toggles % 2 == 1, "id {}", id);
        }
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut set: SelectionSet<String> = ["1".to_string()].into_iter().collect();
        let before = set.clone();

        assert!(set.toggle("2".to_string()));
        assert!(!set.toggle("2".to_string()));
        assert_eq!(set.iter().collect::<Vec<_>>(), before.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_unknown_ids_are_accepted() {
        let mut set = SelectionSet::new();
        set.toggle("ghost".to_string());
        set.toggle("1".to_string());
        assert!(set.is_selected(&"ghost".to_string()));

        let known = vec!["1".to_string(), "2".to_string()];
        set.retain_known(&known);
        assert!(!set.is_selected(&"ghost".to_string()));
        assert!(set.is_selected(&"1".to_string()));
    }

    #[test]
    fn test_clear_and_revision() {
        let mut set = SelectionSet::new();
        assert_eq!(set.revision(), 0);

        set.toggle(1u32);
        set.toggle(2u32);
        assert_eq!(set.revision(), 2);

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.revision(), 3);

        // Clearing an empty set is not a change
        set.clear();
        assert_eq!(set.revision(), 3);
    }

    #[test]
    fn test_filter_keeps_collection_order() {
        let items = vec![("3", 'c'), ("1", 'a'), ("2", 'b')];
        let set: SelectionSet<&str> = ["1", "3"].into_iter().collect();

        let picked: Vec<char> = set.filter(&items, |item| &item.0).iter().map(|i| i.1).collect();
        assert_eq!(picked, vec!['c', 'a']);
    }
}
