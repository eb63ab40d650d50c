// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::collections::HashMap;
use std::sync::Arc;

use slotmap::SlotMap;

use crate::audio::source::traits::source_id;

slotmap::new_key_type! {
    /// A stable handle to a mixer entry. Handles stay valid across inserts, moves
    /// and swaps of other entries and are never reused for a different entry.
    pub struct SourceKey;
}

pub(super) struct Entry<S: ?Sized> {
    pub source: Arc<S>,
    pub owned: bool,
    pub solo: bool,
    prev: Option<SourceKey>,
    next: Option<SourceKey>,
}

/// An ordered, doubly linked list of mixer entries stored in a slot map. Linking
/// and unlinking never allocates, and every operation other than `insert_before`
/// and `drain` is O(1).
pub(super) struct SourceList<S: ?Sized> {
    entries: SlotMap<SourceKey, Entry<S>>,
    head: Option<SourceKey>,
    tail: Option<SourceKey>,
    by_source: HashMap<usize, SourceKey>,
    solo_count: usize,
}

impl<S: ?Sized> SourceList<S> {
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            head: None,
            tail: None,
            by_source: HashMap::new(),
            solo_count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn solo_count(&self) -> usize {
        self.solo_count
    }

    pub fn find(&self, source: &Arc<S>) -> Option<SourceKey> {
        self.by_source.get(&source_id(source)).copied()
    }

    pub fn get(&self, key: SourceKey) -> Option<&Entry<S>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: SourceKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn first(&self) -> Option<SourceKey> {
        self.head
    }

    pub fn last(&self) -> Option<SourceKey> {
        self.tail
    }

    pub fn next(&self, key: SourceKey) -> Option<SourceKey> {
        self.entries.get(key).and_then(|e| e.next)
    }

    pub fn prev(&self, key: SourceKey) -> Option<SourceKey> {
        self.entries.get(key).and_then(|e| e.prev)
    }

    /// Inserts a new entry before `before`, or at the end when `before` is None. The
    /// caller has already checked that the source is not present and `before` is valid.
    pub fn insert_before(
        &mut self,
        before: Option<SourceKey>,
        source: Arc<S>,
        owned: bool,
    ) -> SourceKey {
        let id = source_id(&source);
        let key = self.entries.insert(Entry {
            source,
            owned,
            solo: false,
            prev: None,
            next: None,
        });
        self.by_source.insert(id, key);
        self.link_before(key, before);
        key
    }

    /// Removes an entry, clearing its solo flag first.
    pub fn remove(&mut self, key: SourceKey) -> Option<Entry<S>> {
        if !self.entries.contains_key(key) {
            return None;
        }
        self.set_solo(key, false);
        self.unlink(key);
        let entry = self.entries.remove(key)?;
        self.by_source.remove(&source_id(&entry.source));
        Some(entry)
    }

    /// Moves `target` so it sits right before `before`, or to the end when `before`
    /// is None.
    pub fn move_before(&mut self, target: SourceKey, before: Option<SourceKey>) -> bool {
        if !self.entries.contains_key(target) || before.is_some_and(|b| !self.entries.contains_key(b))
        {
            return false;
        }
        if before == Some(target) {
            return true;
        }
        self.unlink(target);
        self.link_before(target, before);
        true
    }

    /// Exchanges the list positions of two entries.
    pub fn swap(&mut self, a: SourceKey, b: SourceKey) -> bool {
        if !self.entries.contains_key(a) || !self.entries.contains_key(b) {
            return false;
        }
        if a == b {
            return true;
        }
        let after_a = self.next(a);
        let after_b = self.next(b);
        if after_a == Some(b) {
            self.move_before(b, Some(a));
        } else if after_b == Some(a) {
            self.move_before(a, Some(b));
        } else {
            self.move_before(b, after_a);
            self.move_before(a, after_b);
        }
        true
    }

    /// Sets the solo flag, keeping the solo count in step. Returns false for an
    /// unknown key.
    pub fn set_solo(&mut self, key: SourceKey, solo: bool) -> bool {
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };
        if entry.solo != solo {
            entry.solo = solo;
            if solo {
                self.solo_count += 1;
            } else {
                self.solo_count -= 1;
            }
        }
        true
    }

    /// Iterates entries in list order.
    pub fn iter(&self) -> impl Iterator<Item = (SourceKey, &Entry<S>)> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let key = cursor?;
            let entry = self.entries.get(key)?;
            cursor = entry.next;
            Some((key, entry))
        })
    }

    /// Removes every entry, returning them in list order.
    pub fn drain(&mut self) -> Vec<Entry<S>> {
        let order: Vec<SourceKey> = self.iter().map(|(key, _)| key).collect();
        let drained: Vec<Entry<S>> = order
            .into_iter()
            .filter_map(|key| self.entries.remove(key))
            .collect();
        self.entries.clear();
        self.by_source.clear();
        self.head = None;
        self.tail = None;
        self.solo_count = 0;
        drained
    }

    fn unlink(&mut self, key: SourceKey) {
        let (prev, next) = match self.entries.get_mut(key) {
            Some(entry) => (entry.prev.take(), entry.next.take()),
            None => return,
        };
        match prev {
            Some(prev) => {
                if let Some(entry) = self.entries.get_mut(prev) {
                    entry.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(next) => {
                if let Some(entry) = self.entries.get_mut(next) {
                    entry.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    fn link_before(&mut self, key: SourceKey, before: Option<SourceKey>) {
        let prev = match before {
            Some(before) => self.entries.get(before).and_then(|e| e.prev),
            None => self.tail,
        };
        if let Some(entry) = self.entries.get_mut(key) {
            entry.prev = prev;
            entry.next = before;
        }
        match prev {
            Some(prev) => {
                if let Some(entry) = self.entries.get_mut(prev) {
                    entry.next = Some(key);
                }
            }
            None => self.head = Some(key),
        }
        match before {
            Some(before) => {
                if let Some(entry) = self.entries.get_mut(before) {
                    entry.prev = Some(key);
                }
            }
            None => self.tail = Some(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{SourceKey, SourceList};

    fn order(list: &SourceList<u32>) -> Vec<u32> {
        list.iter().map(|(_, entry)| *entry.source).collect()
    }

    fn reverse_order(list: &SourceList<u32>) -> Vec<u32> {
        let mut values = Vec::new();
        let mut cursor = list.last();
        while let Some(key) = cursor {
            values.push(*list.get(key).unwrap().source);
            cursor = list.prev(key);
        }
        values
    }

    fn build(values: &[u32]) -> (SourceList<u32>, Vec<SourceKey>) {
        let mut list = SourceList::new();
        let keys = values
            .iter()
            .map(|v| list.insert_before(None, Arc::new(*v), false))
            .collect();
        (list, keys)
    }

    #[test]
    fn test_insert_order() {
        let (mut list, keys) = build(&[1, 2, 3]);
        list.insert_before(Some(keys[0]), Arc::new(0), false);
        list.insert_before(Some(keys[2]), Arc::new(5), true);
        assert_eq!(order(&list), vec![0, 1, 2, 5, 3]);
        assert_eq!(reverse_order(&list), vec![3, 5, 2, 1, 0]);
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn test_remove_keeps_links() {
        let (mut list, keys) = build(&[1, 2, 3]);
        assert!(list.remove(keys[1]).is_some());
        assert!(list.remove(keys[1]).is_none());
        assert_eq!(order(&list), vec![1, 3]);
        list.remove(keys[0]);
        list.remove(keys[2]);
        assert!(list.is_empty());
        assert_eq!(list.first(), None);
        assert_eq!(list.last(), None);
    }

    #[test]
    fn test_swap_adjacent_and_distant() {
        let (mut list, keys) = build(&[1, 2, 3, 4, 5]);
        assert!(list.swap(keys[0], keys[1]));
        assert_eq!(order(&list), vec![2, 1, 3, 4, 5]);
        assert!(list.swap(keys[3], keys[2]));
        assert_eq!(order(&list), vec![2, 1, 4, 3, 5]);
        assert!(list.swap(keys[1], keys[4]));
        assert_eq!(order(&list), vec![5, 1, 4, 3, 2]);
        assert_eq!(reverse_order(&list), vec![2, 3, 4, 1, 5]);
        assert!(list.swap(keys[2], keys[2]));
        assert_eq!(order(&list), vec![5, 1, 4, 3, 2]);
    }

    #[test]
    fn test_move_before() {
        let (mut list, keys) = build(&[1, 2, 3, 4]);
        assert!(list.move_before(keys[3], Some(keys[0])));
        assert_eq!(order(&list), vec![4, 1, 2, 3]);
        assert!(list.move_before(keys[3], None));
        assert_eq!(order(&list), vec![1, 2, 3, 4]);
        assert!(list.move_before(keys[1], Some(keys[1])));
        assert_eq!(order(&list), vec![1, 2, 3, 4]);
        assert_eq!(reverse_order(&list), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_solo_count_tracks_transitions() {
        let (mut list, keys) = build(&[1, 2, 3]);
        list.set_solo(keys[0], true);
        list.set_solo(keys[0], true);
        list.set_solo(keys[1], true);
        assert_eq!(list.solo_count(), 2);
        list.remove(keys[0]);
        assert_eq!(list.solo_count(), 1);
        list.set_solo(keys[1], false);
        assert_eq!(list.solo_count(), 0);
        assert!(!list.set_solo(keys[0], true));
    }

    #[test]
    fn test_find_and_drain() {
        let mut list = SourceList::new();
        let shared = Arc::new(7u32);
        let key = list.insert_before(None, shared.clone(), true);
        list.insert_before(None, Arc::new(8u32), false);
        assert_eq!(list.find(&shared), Some(key));
        assert_eq!(list.find(&Arc::new(7u32)), None);

        let drained = list.drain();
        assert_eq!(drained.len(), 2);
        assert!(drained[0].owned);
        assert!(list.is_empty());
        assert_eq!(list.find(&shared), None);
    }
}
