//! NM-side error kinds, mapped to wire [`ErrorCode`]s at the session
//! boundary (spec §7).

use dfs_common::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum NmError {
    #[error("file not found")]
    FileNotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("file already exists")]
    FileExists,
    #[error("no storage server available")]
    NoStorageServer,
    #[error("storage server communication failed: {0}")]
    SsCommFailed(String),
    #[error("invalid command")]
    InvalidCommand,
    #[error("server error: {0}")]
    ServerError(String),
}

impl NmError {
    pub fn code(&self) -> ErrorCode {
        match self {
            NmError::FileNotFound => ErrorCode::FileNotFound,
            NmError::Unauthorized => ErrorCode::Unauthorized,
            NmError::FileExists => ErrorCode::FileExists,
            NmError::NoStorageServer => ErrorCode::NoStorageServer,
            NmError::SsCommFailed(_) => ErrorCode::ConnectionFailed,
            NmError::InvalidCommand => ErrorCode::InvalidCommand,
            NmError::ServerError(_) => ErrorCode::ServerError,
        }
    }
}
