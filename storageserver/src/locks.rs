//! Per-sentence advisory lock table (spec §4.5, §5).
//!
//! Entries are keyed by `(filename, sentence_index)` and created on first
//! use. Acquisition is non-blocking: a contended slot fails immediately
//! with the current holder's name rather than waiting, since a write
//! session holds its lock across multiple socket round-trips and a real
//! mutex guard can't be carried across `.await` points cleanly.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct LockTable {
    holders: DashMap<(String, usize), String>,
}

impl LockTable {
    pub fn new() -> LockTable {
        LockTable::default()
    }

    /// Attempts to acquire the lock for `(file, sentence)` on behalf of
    /// `username`. On contention, returns the current holder's name.
    pub fn try_acquire(&self, file: &str, sentence: usize, username: &str) -> Result<(), String> {
        match self.holders.entry((file.to_owned(), sentence)) {
            Entry::Occupied(entry) => Err(entry.get().clone()),
            Entry::Vacant(entry) => {
                entry.insert(username.to_owned());
                Ok(())
            }
        }
    }

    pub fn release(&self, file: &str, sentence: usize) {
        self.holders.remove(&(file.to_owned(), sentence));
    }

    #[cfg(test)]
    pub fn holder(&self, file: &str, sentence: usize) -> Option<String> {
        self.holders.get(&(file.to_owned(), sentence)).map(|h| h.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_writer_sees_the_first_holders_name() {
        let table = LockTable::new();
        assert!(table.try_acquire("c.txt", 0, "alice").is_ok());
        let err = table.try_acquire("c.txt", 0, "bob").unwrap_err();
        assert_eq!(err, "alice");
    }

    #[test]
    fn other_sentences_are_independently_lockable() {
        let table = LockTable::new();
        assert!(table.try_acquire("c.txt", 0, "alice").is_ok());
        assert!(table.try_acquire("c.txt", 1, "bob").is_ok());
    }

    #[test]
    fn release_frees_the_slot_for_reacquisition() {
        let table = LockTable::new();
        table.try_acquire("c.txt", 0, "alice").unwrap();
        table.release("c.txt", 0);
        assert!(table.holder("c.txt", 0).is_none());
        assert!(table.try_acquire("c.txt", 0, "bob").is_ok());
    }
}
