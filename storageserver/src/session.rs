//! Per-connection dispatch for both SS ports (spec §4.6, §6).
//!
//! Each connection carries exactly one high-level operation, matching the
//! client's "open a fresh session per op" protocol and the NM's
//! one-call-per-connection forwarding style.

use std::time::Duration;

use dfs_common::{ErrorCode, MessageKind, Record, WireError, STREAM_STOP};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::locks::LockTable;
use crate::storage::{Storage, StorageError};
use crate::write_session;

const STREAM_TOKEN_DELAY: Duration = Duration::from_millis(100);

/// Handles one connection on the client-facing port: READ, WRITE, STREAM,
/// or UNDO.
pub async fn handle_client_request<S>(storage: &Storage, locks: &LockTable, stream: &mut S, request: Record) -> Result<(), WireError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match request.kind {
        MessageKind::Read => handle_read(storage, stream, &request).await,
        MessageKind::Write => write_session::run(storage, locks, stream, &request).await,
        MessageKind::Stream => handle_stream(storage, stream, &request).await,
        MessageKind::Undo => handle_undo(storage, stream, &request).await,
        other => {
            dfs_common::write_record(stream, &Record::response(ErrorCode::InvalidCommand, format!("unexpected message kind on storage server client port: {other:?}"))).await
        }
    }
}

/// Handles one connection on the NM-facing port: SS_CREATE, SS_DELETE,
/// SS_READ (used by `exec`), or SS_STAT.
pub async fn handle_nm_request<S>(storage: &Storage, stream: &mut S, request: Record) -> Result<(), WireError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match request.kind {
        MessageKind::SsCreate => match storage.create(&request.filename).await {
            Ok(()) => dfs_common::write_record(stream, &Record::ok_response("created")).await,
            Err(e) => dfs_common::write_record(stream, &Record::response(ErrorCode::ServerError, e.to_string())).await,
        },
        MessageKind::SsDelete => match storage.delete(&request.filename).await {
            Ok(()) => dfs_common::write_record(stream, &Record::ok_response("deleted")).await,
            Err(e) => dfs_common::write_record(stream, &Record::response(ErrorCode::ServerError, e.to_string())).await,
        },
        MessageKind::SsRead => handle_read(storage, stream, &request).await,
        MessageKind::SsStat => match storage.stats(&request.filename).await {
            Ok((word_count, char_count)) => {
                let mut response = Record::ok_response("stats");
                response.flags = word_count as i32;
                response.word_index = char_count as i32;
                dfs_common::write_record(stream, &response).await
            }
            Err(e) => dfs_common::write_record(stream, &Record::response(ErrorCode::ServerError, e.to_string())).await,
        },
        other => {
            dfs_common::write_record(stream, &Record::response(ErrorCode::InvalidCommand, format!("unexpected message kind on storage server NM port: {other:?}"))).await
        }
    }
}

async fn handle_read<S>(storage: &Storage, stream: &mut S, request: &Record) -> Result<(), WireError>
where
    S: AsyncWrite + Unpin,
{
    match storage.read(&request.filename).await {
        Ok(bytes) => {
            let mut response = Record::ok_response("");
            response.data = bytes;
            dfs_common::write_record(stream, &response).await
        }
        Err(_) => dfs_common::write_record(stream, &Record::response(ErrorCode::FileNotFound, "file not found")).await,
    }
}

async fn handle_stream<S>(storage: &Storage, stream: &mut S, request: &Record) -> Result<(), WireError>
where
    S: AsyncWrite + Unpin,
{
    let content = match storage.read(&request.filename).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return dfs_common::write_record(stream, &Record::response(ErrorCode::FileNotFound, "file not found")).await;
        }
    };
    let text = String::from_utf8_lossy(&content);

    for token in text.split_whitespace() {
        dfs_common::write_record(stream, &Record::ok_response(token)).await?;
        tokio::time::sleep(STREAM_TOKEN_DELAY).await;
    }
    dfs_common::write_record(stream, &Record::ok_response(STREAM_STOP)).await
}

async fn handle_undo<S>(storage: &Storage, stream: &mut S, request: &Record) -> Result<(), WireError>
where
    S: AsyncWrite + Unpin,
{
    match storage.undo(&request.filename).await {
        Ok(()) => dfs_common::write_record(stream, &Record::ok_response("undo complete")).await,
        Err(StorageError::NoShadow) => {
            dfs_common::write_record(stream, &Record::response(ErrorCode::NoUndoAvailable, "no undo available")).await
        }
        Err(e) => dfs_common::write_record(stream, &Record::response(ErrorCode::ServerError, e.to_string())).await,
    }
}
