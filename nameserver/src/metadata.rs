//! File records and access lists (spec §3).

use dfs_common::AccessRight;
use std::time::{SystemTime, UNIX_EPOCH};

/// One access-list entry. Duplicate usernames are not permitted within an
/// [`AccessList`]; re-granting overwrites the existing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessEntry {
    pub username: String,
    pub rights: AccessRight,
}

/// Ordered set of `(username, rights)` pairs attached to a file.
///
/// Invariant: the owner is present with [`AccessRight::READ_WRITE`] from
/// creation and can never be removed (spec §3, §8).
#[derive(Debug, Clone)]
pub struct AccessList {
    owner: String,
    entries: Vec<AccessEntry>,
}

impl AccessList {
    pub fn new(owner: impl Into<String>) -> AccessList {
        let owner = owner.into();
        let entries = vec![AccessEntry { username: owner.clone(), rights: AccessRight::READ_WRITE }];
        AccessList { owner, entries }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn entries(&self) -> &[AccessEntry] {
        &self.entries
    }

    pub fn rights_of(&self, username: &str) -> AccessRight {
        self.entries
            .iter()
            .find(|e| e.username == username)
            .map(|e| e.rights)
            .unwrap_or(AccessRight::NONE)
    }

    /// Upserts an entry. Re-granting a username overwrites its prior rights
    /// (spec §8: "ADDACCESS u RW; ADDACCESS u R ⇒ final rights = R").
    pub fn grant(&mut self, username: impl Into<String>, rights: AccessRight) {
        let username = username.into();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.username == username) {
            entry.rights = rights;
        } else {
            self.entries.push(AccessEntry { username, rights });
        }
    }

    /// Removes an entry. Refuses to remove the owner (spec §3, §4.3).
    pub fn revoke(&mut self, username: &str) -> Result<(), RevokeError> {
        if username == self.owner {
            return Err(RevokeError::CannotRemoveOwner);
        }
        self.entries.retain(|e| e.username != username);
        Ok(())
    }

    pub fn restore(owner: String, entries: Vec<AccessEntry>) -> AccessList {
        AccessList { owner, entries }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RevokeError {
    #[error("cannot remove the owner from the access list")]
    CannotRemoveOwner,
}

/// One file's metadata (spec §3). `ss_index` always points to a live entry
/// in the name server's storage-server registry.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub filename: String,
    pub created: u64,
    pub last_modified: u64,
    pub last_accessed: u64,
    pub word_count: u32,
    pub char_count: u32,
    pub ss_index: usize,
    pub access: AccessList,
}

impl FileRecord {
    pub fn new(filename: impl Into<String>, owner: impl Into<String>, ss_index: usize) -> FileRecord {
        let now = unix_now();
        FileRecord {
            filename: filename.into(),
            created: now,
            last_modified: now,
            last_accessed: now,
            word_count: 0,
            char_count: 0,
            ss_index,
            access: AccessList::new(owner),
        }
    }

    pub fn owner(&self) -> &str {
        self.access.owner()
    }

    pub fn touch_accessed(&mut self) {
        self.last_accessed = unix_now();
    }

    pub fn touch_modified(&mut self) {
        let now = unix_now();
        self.last_modified = now;
        self.last_accessed = now;
    }
}

pub fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_always_holds_read_write() {
        let record = FileRecord::new("a.txt", "alice", 0);
        assert_eq!(record.access.rights_of("alice"), AccessRight::READ_WRITE);
    }

    #[test]
    fn regrant_overwrites_rights() {
        let mut list = AccessList::new("alice");
        list.grant("bob", AccessRight::READ_WRITE);
        list.grant("bob", AccessRight::READ);
        assert_eq!(list.rights_of("bob"), AccessRight::READ);
    }

    #[test]
    fn revoke_then_no_entry_remains() {
        let mut list = AccessList::new("alice");
        list.grant("bob", AccessRight::READ);
        list.revoke("bob").unwrap();
        assert_eq!(list.rights_of("bob"), AccessRight::NONE);
    }

    #[test]
    fn owner_cannot_be_revoked() {
        let mut list = AccessList::new("alice");
        assert_eq!(list.revoke("alice"), Err(RevokeError::CannotRemoveOwner));
        assert_eq!(list.rights_of("alice"), AccessRight::READ_WRITE);
    }
}
