use crate::model::Record;
use dashmap::DashMap;

/// Concurrent name → record map serving registry reads.
///
/// Callers never lock: readers go straight to the shard. Registries serialize
/// their own mutations so that the cache is only written after the table.
pub struct RecordCache<R> {
    entries: DashMap<String, R>,
}

impl<R> Default for RecordCache<R> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<R: Record> RecordCache<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<R> {
        self.entries.get(name).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, record: R) {
        self.entries.insert(record.name().to_string(), record);
    }

    pub fn remove(&self, name: &str) -> Option<R> {
        self.entries.remove(name).map(|(_, record)| record)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of every record, ordered by name.
    pub fn values(&self) -> Vec<R> {
        let mut records: Vec<R> = self.entries.iter().map(|e| e.value().clone()).collect();
        records.sort_by(|a, b| a.name().cmp(b.name()));
        records
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}
