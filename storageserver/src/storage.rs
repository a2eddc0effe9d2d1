//! File bytes on disk, plus the undo shadow tree (spec §3, §4.6).
//!
//! Filenames may embed `/` to indicate subdirectories; parent directories
//! are created as needed on write. The shadow tree mirrors the storage
//! root's layout and holds at most one pre-image per file. All I/O goes
//! through `tokio::fs`, matching the teacher's `fs/mod.rs` and
//! `examples/shadow_fs/fs/mod.rs`, which never touch `std::fs` directly
//! from an async handler.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("no undo shadow available for this file")]
    NoShadow,
}

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
    shadow_root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>, shadow_root: impl Into<PathBuf>) -> Storage {
        Storage { root: root.into(), shadow_root: shadow_root.into() }
    }

    fn live_path(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    fn shadow_path(&self, filename: &str) -> PathBuf {
        self.shadow_root.join(filename)
    }

    pub async fn exists(&self, filename: &str) -> bool {
        fs::metadata(self.live_path(filename)).await.map(|m| m.is_file()).unwrap_or(false)
    }

    pub async fn create(&self, filename: &str) -> Result<(), StorageError> {
        let path = self.live_path(filename);
        ensure_parent(&path).await?;
        fs::write(&path, []).await?;
        Ok(())
    }

    pub async fn read(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        Ok(fs::read(self.live_path(filename)).await?)
    }

    pub async fn write(&self, filename: &str, content: &[u8]) -> Result<(), StorageError> {
        let path = self.live_path(filename);
        ensure_parent(&path).await?;
        fs::write(path, content).await?;
        Ok(())
    }

    pub async fn delete(&self, filename: &str) -> Result<(), StorageError> {
        fs::remove_file(self.live_path(filename)).await?;
        let _ = fs::remove_file(self.shadow_path(filename)).await;
        Ok(())
    }

    /// Copies the current bytes of `filename` into the shadow tree,
    /// overwriting any prior pre-image (spec §4.5 step 2).
    pub async fn capture_shadow(&self, filename: &str) -> Result<(), StorageError> {
        let live = self.live_path(filename);
        let shadow = self.shadow_path(filename);
        ensure_parent(&shadow).await?;
        fs::copy(live, shadow).await?;
        Ok(())
    }

    /// Restores the shadow's pre-image over the live file. Does not itself
    /// create a new shadow, so undo is not an undo-of-undo (spec §4.6).
    pub async fn undo(&self, filename: &str) -> Result<(), StorageError> {
        let shadow = self.shadow_path(filename);
        if !fs::metadata(&shadow).await.map(|m| m.is_file()).unwrap_or(false) {
            return Err(StorageError::NoShadow);
        }
        fs::copy(&shadow, self.live_path(filename)).await?;
        Ok(())
    }

    /// Word and character counts over the whole file, refreshed on demand
    /// for `info`/`SS_STAT` (spec §4.3).
    pub async fn stats(&self, filename: &str) -> Result<(u32, u32), StorageError> {
        let content = self.read(filename).await?;
        let text = String::from_utf8_lossy(&content);
        let word_count = text.split_whitespace().count() as u32;
        let char_count = text.chars().count() as u32;
        Ok((word_count, char_count))
    }

    /// Newline-joined inventory of regular files under the storage root,
    /// sent as the payload of `REGISTER_SS` (spec §4.7).
    pub async fn inventory(&self) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        walk(self.root.clone(), self.root.clone(), &mut names).await?;
        Ok(names)
    }
}

async fn ensure_parent(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    Ok(())
}

fn walk<'a>(root: PathBuf, dir: PathBuf, names: &'a mut Vec<String>) -> std::pin::Pin<Box<dyn std::future::Future<Output = io::Result<()>> + Send + 'a>> {
    Box::pin(async move {
        let is_dir = fs::metadata(&dir).await.map(|m| m.is_dir()).unwrap_or(false);
        if !is_dir {
            return Ok(());
        }
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                walk(root.clone(), path, names).await?;
            } else if file_type.is_file() {
                if let Ok(relative) = path.strip_prefix(&root) {
                    let name = relative.to_string_lossy().replace(std::path::MAIN_SEPARATOR, "/");
                    names.push(name);
                }
            }
        }
        Ok(())
    })
}
