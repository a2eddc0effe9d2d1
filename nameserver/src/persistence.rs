//! Flat-file checkpointing of the metadata store (spec §4.2/§6).
//!
//! The checkpoint is a sequence of `{FileRecord, access_count, AccessEntry
//! × access_count}` records describing every file currently live in the
//! store. It is rewritten in full after every mutation and replayed to EOF
//! on startup. There is no journaling: a crash mid-write can corrupt the
//! tail of the file, same as the hand-rolled original — documented
//! limitation, not fixed here.

use std::io;
use std::path::{Path, PathBuf};

use dfs_common::AccessRight;
use dfs_common::primitive;
use tokio::fs;

use crate::metadata::{AccessEntry, AccessList, FileRecord};
use crate::store::MetadataStore;

pub struct Checkpoint {
    path: PathBuf,
}

impl Checkpoint {
    pub fn new(path: impl Into<PathBuf>) -> Checkpoint {
        Checkpoint { path: path.into() }
    }

    /// Replays the checkpoint file into a fresh [`MetadataStore`]. Returns
    /// an empty store if the file does not exist yet (first run).
    pub async fn load(&self) -> io::Result<MetadataStore> {
        let mut store = MetadataStore::new();
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(store),
            Err(e) => return Err(e),
        };

        let mut cursor: &[u8] = &bytes;
        while !cursor.is_empty() {
            let record = decode_record(&mut cursor)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "corrupt checkpoint tail"))?;
            store.insert(record);
        }
        Ok(store)
    }

    /// Rewrites the whole checkpoint file from the store's current live
    /// records, via a temp-file-then-rename so a reader never observes a
    /// half-written file (the rename itself is still not a substitute for
    /// the journaling this format deliberately omits). Runs under the
    /// NM's state mutex (see `NameServer::persist`), so this stays on
    /// `tokio::fs` rather than blocking the worker thread that guard is
    /// held from.
    pub async fn save(&self, store: &MetadataStore) -> io::Result<()> {
        let mut buf = Vec::new();
        for record in store.iter() {
            encode_record(&mut buf, record);
        }

        let tmp_path = tmp_path_for(&self.path);
        fs::write(&tmp_path, &buf).await?;
        fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn encode_record(out: &mut Vec<u8>, record: &FileRecord) {
    primitive::write_string(out, &record.filename);
    primitive::write_string(out, record.access.owner());
    primitive::write_u64(out, record.created);
    primitive::write_u64(out, record.last_modified);
    primitive::write_u64(out, record.last_accessed);
    primitive::write_u32(out, record.word_count);
    primitive::write_u32(out, record.char_count);
    primitive::write_u32(out, record.ss_index as u32);

    primitive::write_u32(out, record.access.entries().len() as u32);
    for entry in record.access.entries() {
        primitive::write_string(out, &entry.username);
        out.push(entry.rights.bits());
    }
}

#[derive(Debug)]
struct CorruptCheckpoint;

fn decode_record(src: &mut &[u8]) -> Result<FileRecord, CorruptCheckpoint> {
    let err = |_| CorruptCheckpoint;

    let filename = primitive::read_string(src, dfs_common::MAX_FILENAME_LEN).map_err(err)?;
    let owner = primitive::read_string(src, dfs_common::MAX_USERNAME_LEN).map_err(err)?;
    let created = primitive::read_u64(src).map_err(err)?;
    let last_modified = primitive::read_u64(src).map_err(err)?;
    let last_accessed = primitive::read_u64(src).map_err(err)?;
    let word_count = primitive::read_u32(src).map_err(err)?;
    let char_count = primitive::read_u32(src).map_err(err)?;
    let ss_index = primitive::read_u32(src).map_err(err)? as usize;

    let access_count = primitive::read_u32(src).map_err(err)?;
    let mut entries = Vec::with_capacity(access_count as usize);
    for _ in 0..access_count {
        let username = primitive::read_string(src, dfs_common::MAX_USERNAME_LEN).map_err(err)?;
        if src.is_empty() {
            return Err(CorruptCheckpoint);
        }
        let bits = src[0];
        *src = &src[1..];
        let rights = AccessRight::from_bits(bits).ok_or(CorruptCheckpoint)?;
        entries.push(AccessEntry { username, rights });
    }

    Ok(FileRecord {
        filename,
        created,
        last_modified,
        last_accessed,
        word_count,
        char_count,
        ss_index,
        access: AccessList::restore(owner, entries),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn checkpoint_round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nm.checkpoint");
        let checkpoint = Checkpoint::new(&path);

        let mut store = MetadataStore::new();
        let mut record = FileRecord::new("a.txt", "alice", 0);
        record.access.grant("bob", AccessRight::READ);
        record.word_count = 5;
        store.insert(record);

        checkpoint.save(&store).await.unwrap();

        let restored = checkpoint.load().await.unwrap();
        let found = restored.iter().find(|r| r.filename == "a.txt").unwrap();
        assert_eq!(found.owner(), "alice");
        assert_eq!(found.access.rights_of("bob"), AccessRight::READ);
        assert_eq!(found.word_count, 5);
    }

    #[tokio::test]
    async fn missing_checkpoint_file_yields_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoint = Checkpoint::new(dir.path().join("does-not-exist"));
        let store = checkpoint.load().await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn delete_then_save_drops_the_record_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nm.checkpoint");
        let checkpoint = Checkpoint::new(&path);

        let mut store = MetadataStore::new();
        store.insert(FileRecord::new("a.txt", "alice", 0));
        store.insert(FileRecord::new("b.txt", "alice", 0));
        checkpoint.save(&store).await.unwrap();

        store.remove("a.txt");
        checkpoint.save(&store).await.unwrap();

        let mut restored = checkpoint.load().await.unwrap();
        assert!(restored.find("a.txt").is_none());
        assert!(!restored.is_empty());
    }
}
