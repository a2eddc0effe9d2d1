//! The metadata store: a hash-indexed directory fronted by a bounded LRU
//! hot-set (spec §4.2).
//!
//! Correctness never depends on the LRU — it only accelerates repeated
//! lookups. A miss always falls through to the hash map. On delete, the
//! removed filename's entry is evicted from *both* structures; unlike the
//! original C source (spec §9 design note (b)), deleting one file never
//! clobbers anything else sharing its bucket, because there is no bucket to
//! share — `HashMap` already gives each key its own slot.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::metadata::FileRecord;

const DEFAULT_HOT_SET_CAPACITY: usize = 100;

pub struct MetadataStore {
    files: HashMap<String, FileRecord>,
    hot_set: LruCache<String, ()>,
}

impl MetadataStore {
    pub fn new() -> MetadataStore {
        Self::with_hot_set_capacity(DEFAULT_HOT_SET_CAPACITY)
    }

    pub fn with_hot_set_capacity(capacity: usize) -> MetadataStore {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        MetadataStore { files: HashMap::new(), hot_set: LruCache::new(capacity) }
    }

    /// O(1) average lookup. A hit in the hot-set is moved to front; a miss
    /// falls through to the hash map and, on success, seeds the hot-set.
    pub fn find(&mut self, filename: &str) -> Option<&FileRecord> {
        if self.hot_set.get(filename).is_some() {
            return self.files.get(filename);
        }
        if self.files.contains_key(filename) {
            self.hot_set.put(filename.to_owned(), ());
        }
        self.files.get(filename)
    }

    pub fn find_mut(&mut self, filename: &str) -> Option<&mut FileRecord> {
        if self.files.contains_key(filename) {
            self.hot_set.put(filename.to_owned(), ());
        }
        self.files.get_mut(filename)
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.files.contains_key(filename)
    }

    pub fn insert(&mut self, record: FileRecord) {
        let filename = record.filename.clone();
        self.files.insert(filename.clone(), record);
        self.hot_set.put(filename, ());
    }

    /// Removes a file's record, evicting it from the hot-set too, so no
    /// later `find` can return a stale record for a deleted name (spec §8).
    pub fn remove(&mut self, filename: &str) -> Option<FileRecord> {
        self.hot_set.pop(filename);
        self.files.remove(filename)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values()
    }
}

impl Default for MetadataStore {
    fn default() -> Self {
        MetadataStore::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> FileRecord {
        FileRecord::new(name, "alice", 0)
    }

    #[test]
    fn find_returns_filename_matching_the_query() {
        let mut store = MetadataStore::new();
        store.insert(record("a.txt"));
        let found = store.find("a.txt").unwrap();
        assert_eq!(found.filename, "a.txt");
    }

    #[test]
    fn delete_evicts_from_hot_set_so_no_stale_hit() {
        let mut store = MetadataStore::new();
        store.insert(record("a.txt"));
        store.find("a.txt");
        store.remove("a.txt");
        assert!(store.find("a.txt").is_none());
    }

    #[test]
    fn delete_of_one_file_does_not_affect_others() {
        let mut store = MetadataStore::new();
        store.insert(record("a.txt"));
        store.insert(record("b.txt"));
        store.remove("a.txt");
        assert!(store.find("b.txt").is_some());
    }

    #[test]
    fn hot_set_capacity_is_enforced() {
        let mut store = MetadataStore::with_hot_set_capacity(2);
        store.insert(record("a.txt"));
        store.insert(record("b.txt"));
        store.insert(record("c.txt"));
        // All three remain findable via the hash map fallback even though
        // the bounded hot-set could not hold all of them.
        assert!(store.find("a.txt").is_some());
        assert!(store.find("b.txt").is_some());
        assert!(store.find("c.txt").is_some());
    }
}
