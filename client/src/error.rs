//! Client-side error type. Wire/transport failures are never retried
//! (spec §7): the caller is expected to reissue the operation.

use dfs_common::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("wire error: {0}")]
    Wire(#[from] dfs_common::WireError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("the name server returned an address that could not be parsed")]
    InvalidSsAddress,
    #[error("{message}")]
    Remote { code: ErrorCode, message: String },
}

impl ClientError {
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Remote { code, .. } => Some(*code),
            _ => None,
        }
    }
}
