//! In-memory merge-by-foreign-key.
//!
//! Related rows are collected into one owned arena and indexed by foreign
//! key; the projection step walks indices instead of cloning row groups.

use std::collections::HashMap;
use std::hash::Hash;

pub(super) struct RelatedIndex<K, V> {
    rows: Vec<V>,
    index: HashMap<K, Vec<usize>>,
}

impl<K: Eq + Hash, V> RelatedIndex<K, V> {
    pub fn build(rows: Vec<V>, key_of: impl Fn(&V) -> K) -> Self {
        let mut index: HashMap<K, Vec<usize>> = HashMap::new();
        for (position, row) in rows.iter().enumerate() {
            index.entry(key_of(row)).or_default().push(position);
        }
        Self { rows, index }
    }

    /// Rows grouped under `key`, in arena (fetch) order.
    pub fn get(&self, key: &K) -> impl Iterator<Item = &V> {
        self.index
            .get(key)
            .into_iter()
            .flatten()
            .map(|&position| &self.rows[position])
    }
}
