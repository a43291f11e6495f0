use serde::Serialize;
use std::collections::BTreeMap;

/// Deduplicating map keyed by GitHub's numeric entity id.
///
/// Only `insert_if_absent` writes to it: the first value bound to an id is
/// kept for the lifetime of the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EntityStore<T> {
    entries: BTreeMap<i64, T>,
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> EntityStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `id` to `value` unless `id` is already present.
    /// Returns `true` when the value was inserted.
    pub fn insert_if_absent(&mut self, id: i64, value: T) -> bool {
        if self.contains(id) {
            return false;
        }
        self.entries.insert(id, value);
        true
    }

    #[allow(dead_code)]
    pub fn get(&self, id: i64) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[allow(dead_code)]
    pub fn iter(&self) -> impl Iterator<Item = (i64, &T)> {
        self.entries.iter().map(|(id, value)| (*id, value))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }
}
