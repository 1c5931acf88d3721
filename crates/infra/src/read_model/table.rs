use std::collections::HashMap;
use std::hash::Hash;

/// Keyed table of live records.
///
/// Tables are not locked individually: the store guards all of them with one
/// lock so multi-table operations commit together. Listing returns records in
/// key order, which for time-ordered ids is creation order.
#[derive(Debug, Clone)]
pub struct Table<K, V> {
    rows: HashMap<K, V>,
}

impl<K, V> Table<K, V> {
    pub fn new() -> Self {
        Self { rows: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Table<K, V>
where
    K: Copy + Eq + Hash + Ord,
{
    pub fn get(&self, key: &K) -> Option<&V> {
        self.rows.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.rows.contains_key(key)
    }

    pub fn upsert(&mut self, key: K, value: V) {
        self.rows.insert(key, value);
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.rows.remove(key)
    }

    /// All records in key order.
    pub fn list(&self) -> Vec<&V> {
        let mut keys: Vec<&K> = self.rows.keys().collect();
        keys.sort();
        keys.into_iter().filter_map(|k| self.rows.get(k)).collect()
    }

    /// First record (in key order) matching `predicate`.
    pub fn find<P>(&self, predicate: P) -> Option<&V>
    where
        P: Fn(&V) -> bool,
    {
        self.list().into_iter().find(|v| predicate(v))
    }

    pub fn any<P>(&self, predicate: P) -> bool
    where
        P: Fn(&V) -> bool,
    {
        self.rows.values().any(predicate)
    }
}
