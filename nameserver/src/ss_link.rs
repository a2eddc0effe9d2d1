//! NM-initiated calls to a storage server's NM-facing port: create/delete
//! forwarding and the lazy word/char-count stats refresh (spec §4.3).
//!
//! These calls happen with the metadata mutex released (spec §5: "external
//! calls... must occur with the mutex released; re-check preconditions
//! after re-acquiring").

use dfs_common::{ErrorCode, MessageKind, Record};
use tokio::net::TcpStream;

use crate::registry::SsDescriptor;

#[derive(Debug, thiserror::Error)]
pub enum SsLinkError {
    #[error("connect to storage server failed: {0}")]
    Connect(#[source] std::io::Error),
    #[error("wire error talking to storage server: {0}")]
    Wire(#[from] dfs_common::WireError),
    #[error("storage server reported an error: {0}")]
    Remote(String),
}

async fn open(ss: &SsDescriptor) -> Result<TcpStream, SsLinkError> {
    TcpStream::connect((ss.ip.as_str(), ss.nm_facing_port)).await.map_err(SsLinkError::Connect)
}

async fn call(ss: &SsDescriptor, request: Record) -> Result<Record, SsLinkError> {
    let mut stream = open(ss).await?;
    dfs_common::write_record(&mut stream, &request).await?;
    let response = dfs_common::read_record(&mut stream).await?;
    if !response.error_code.is_success() {
        return Err(SsLinkError::Remote(
            response.data_as_str().unwrap_or("<invalid utf-8>").to_owned(),
        ));
    }
    Ok(response)
}

pub async fn create_file(ss: &SsDescriptor, filename: &str) -> Result<(), SsLinkError> {
    let mut req = Record::new(MessageKind::SsCreate);
    req.filename = filename.to_owned();
    call(ss, req).await.map(|_| ())
}

pub async fn delete_file(ss: &SsDescriptor, filename: &str) -> Result<(), SsLinkError> {
    let mut req = Record::new(MessageKind::SsDelete);
    req.filename = filename.to_owned();
    call(ss, req).await.map(|_| ())
}

pub struct Stats {
    pub word_count: u32,
    pub char_count: u32,
}

/// Fetches fresh word/char counts from the owning SS. Per spec §4.3 this is
/// "silently tolerated on failure" — callers should fall back to the
/// cached values rather than propagate the error to the client.
pub async fn stat_file(ss: &SsDescriptor, filename: &str) -> Result<Stats, SsLinkError> {
    let mut req = Record::new(MessageKind::SsStat);
    req.filename = filename.to_owned();
    let response = call(ss, req).await?;
    Ok(Stats { word_count: response.flags.max(0) as u32, char_count: response.word_index.max(0) as u32 })
}

/// Reads a file's whole content from its owning SS, used by `exec` (spec
/// §4.3: "NM reads file from SS, runs text as shell command").
pub async fn read_file(ss: &SsDescriptor, filename: &str) -> Result<Vec<u8>, SsLinkError> {
    let mut req = Record::new(MessageKind::SsRead);
    req.filename = filename.to_owned();
    let response = call(ss, req).await?;
    Ok(response.data)
}

pub fn error_to_wire(err: &SsLinkError) -> (ErrorCode, String) {
    (ErrorCode::ConnectionFailed, err.to_string())
}
