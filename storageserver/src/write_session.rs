//! The write session state machine (spec §4.5): lock, stream word-level
//! edits, commit. Runs to completion on one TCP connection.

use dfs_common::{ErrorCode, MessageKind, Record, WireError, WRITE_SENTINEL};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::locks::LockTable;
use crate::sentence;
use crate::storage::Storage;

/// Drives one write session to completion. `request` is the initial
/// WRITE record that named the file, sentence index, and username;
/// everything else is read off `stream` as the session progresses.
pub async fn run<S>(storage: &Storage, locks: &LockTable, stream: &mut S, request: &Record) -> Result<(), WireError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let filename = request.filename.clone();
    let username = request.username.clone();
    let k = request.word_index;

    if storage.capture_shadow(&filename).await.is_err() {
        dfs_common::write_record(stream, &Record::response(ErrorCode::ServerError, "failed to capture undo pre-image")).await?;
        return Ok(());
    }

    let original = match storage.read(&filename).await {
        Ok(bytes) => bytes,
        Err(_) => {
            dfs_common::write_record(stream, &Record::response(ErrorCode::ServerError, "failed to read file for editing")).await?;
            return Ok(());
        }
    };
    let text = String::from_utf8_lossy(&original).into_owned();
    let mut sentences = sentence::parse_sentences(&text);
    let count = sentences.len();

    if k < 0 || k as usize > count {
        dfs_common::write_record(stream, &Record::response(ErrorCode::InvalidIndex, "sentence index out of range")).await?;
        return Ok(());
    }
    let target_index = k as usize;
    if target_index == count {
        // k == count means "append a new sentence".
        sentences.push(String::new());
    }

    if let Err(holder) = locks.try_acquire(&filename, target_index, &username) {
        dfs_common::write_record(stream, &Record::response(ErrorCode::SentenceLocked, format!("sentence locked by {holder}"))).await?;
        return Ok(());
    }

    dfs_common::write_record(stream, &Record::ok_response("lock acquired")).await?;

    loop {
        let update = match dfs_common::read_record(stream).await {
            Ok(update) => update,
            Err(e) => {
                locks.release(&filename, target_index);
                return Err(e);
            }
        };

        let data = match update.data_as_str() {
            Ok(s) => s,
            Err(_) => {
                dfs_common::write_record(stream, &Record::error(ErrorCode::InvalidIndex, "update payload is not valid utf-8")).await?;
                continue;
            }
        };
        if data == WRITE_SENTINEL {
            break;
        }

        match apply_update(&mut sentences, target_index, update.word_index, data) {
            Ok(()) => {
                let mut ack = Record::ok_response("ack");
                ack.kind = MessageKind::Ack;
                dfs_common::write_record(stream, &ack).await?;
            }
            Err(()) => {
                dfs_common::write_record(stream, &Record::error(ErrorCode::InvalidIndex, "word index out of range")).await?;
            }
        }
    }

    let content = sentence::reconstruct(&sentences);
    if storage.write(&filename, content.as_bytes()).await.is_err() {
        locks.release(&filename, target_index);
        dfs_common::write_record(stream, &Record::response(ErrorCode::ServerError, "failed to commit file")).await?;
        return Ok(());
    }

    locks.release(&filename, target_index);
    dfs_common::write_record(stream, &Record::ok_response("write committed")).await?;
    Ok(())
}

/// Tokenizes the target sentence on single spaces, validates `word_index`,
/// inserts the update's tokens, reassembles, and re-parses for a split
/// (spec §4.5 step 6). Returns `Err(())` for an out-of-range index; the
/// caller sends INVALID_INDEX and keeps the session open.
fn apply_update(sentences: &mut Vec<String>, target_index: usize, word_index: i32, data: &str) -> Result<(), ()> {
    let mut words = sentence::words(&sentences[target_index]);
    let word_count = words.len();
    if word_index < 0 || word_index as usize > word_count + 1 {
        return Err(());
    }
    let insert_at = (word_index as usize).min(word_count);

    for (offset, token) in sentence::words(data).into_iter().enumerate() {
        words.insert(insert_at + offset, token);
    }

    let reassembled = sentence::join_words(&words);
    let mut parts = sentence::parse_sentences(&reassembled);
    if parts.is_empty() {
        parts.push(String::new());
    }
    sentences.splice(target_index..=target_index, parts);
    Ok(())
}
