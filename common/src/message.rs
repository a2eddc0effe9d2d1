//! The tagged record carried by every DFS interaction, and its codec.

use crate::primitive;
use std::fmt;

/// Closed enumeration of wire message kinds (spec §6).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u32)]
pub enum MessageKind {
    RegisterSs = 100,
    RegisterClient = 101,
    View = 102,
    Read = 103,
    Create = 104,
    Write = 105,
    Delete = 106,
    Info = 107,
    Stream = 108,
    ListUsers = 109,
    AddAccess = 110,
    RemAccess = 111,
    Exec = 112,
    Undo = 113,
    Response = 200,
    SsCreate = 201,
    SsDelete = 202,
    SsRead = 203,
    SsWrite = 204,
    SsStream = 205,
    SsUndo = 206,
    SsStat = 207,
    Ack = 250,
    Error = 255,
    Heartbeat = 256,
}

impl MessageKind {
    pub fn from_u32(v: u32) -> Option<MessageKind> {
        use MessageKind::*;
        Some(match v {
            100 => RegisterSs,
            101 => RegisterClient,
            102 => View,
            103 => Read,
            104 => Create,
            105 => Write,
            106 => Delete,
            107 => Info,
            108 => Stream,
            109 => ListUsers,
            110 => AddAccess,
            111 => RemAccess,
            112 => Exec,
            113 => Undo,
            200 => Response,
            201 => SsCreate,
            202 => SsDelete,
            203 => SsRead,
            204 => SsWrite,
            205 => SsStream,
            206 => SsUndo,
            207 => SsStat,
            250 => Ack,
            255 => Error,
            256 => Heartbeat,
            _ => return None,
        })
    }
}

/// Closed enumeration of error codes (spec §6).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    FileNotFound = 1,
    Unauthorized = 2,
    FileExists = 3,
    InvalidIndex = 4,
    SentenceLocked = 5,
    NoStorageServer = 6,
    ConnectionFailed = 7,
    InvalidCommand = 8,
    ServerError = 9,
    NoUndoAvailable = 10,
}

impl ErrorCode {
    pub fn from_u32(v: u32) -> Option<ErrorCode> {
        use ErrorCode::*;
        Some(match v {
            0 => Success,
            1 => FileNotFound,
            2 => Unauthorized,
            3 => FileExists,
            4 => InvalidIndex,
            5 => SentenceLocked,
            6 => NoStorageServer,
            7 => ConnectionFailed,
            8 => InvalidCommand,
            9 => ServerError,
            10 => NoUndoAvailable,
            _ => return None,
        })
    }

    pub fn is_success(self) -> bool {
        matches!(self, ErrorCode::Success)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::Success => "success",
            ErrorCode::FileNotFound => "file not found",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::FileExists => "file already exists",
            ErrorCode::InvalidIndex => "invalid index",
            ErrorCode::SentenceLocked => "sentence locked",
            ErrorCode::NoStorageServer => "no storage server available",
            ErrorCode::ConnectionFailed => "connection failed",
            ErrorCode::InvalidCommand => "invalid command",
            ErrorCode::ServerError => "server error",
            ErrorCode::NoUndoAvailable => "no undo available",
        };
        f.write_str(s)
    }
}

/// The one record shape that carries every interaction on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub kind: MessageKind,
    pub error_code: ErrorCode,
    pub username: String,
    pub filename: String,
    pub target_user: String,
    /// Doubles as view flags / sentence index depending on `kind`.
    pub flags: i32,
    pub word_index: i32,
    pub ss_ip: String,
    pub ss_port: u16,
    pub data: Vec<u8>,
}

impl Record {
    /// Builds a bare record of the given kind with every other field at its
    /// zero value; callers fill in what their operation needs.
    pub fn new(kind: MessageKind) -> Record {
        Record {
            kind,
            error_code: ErrorCode::Success,
            username: String::new(),
            filename: String::new(),
            target_user: String::new(),
            flags: 0,
            word_index: 0,
            ss_ip: String::new(),
            ss_port: 0,
            data: Vec::new(),
        }
    }

    /// Builds a `RESPONSE` record carrying a human-readable message and
    /// error code, per spec §7 ("every operation returns exactly one
    /// RESPONSE record... with an error code and a short human-readable
    /// message").
    pub fn response(error_code: ErrorCode, message: impl Into<String>) -> Record {
        Record {
            error_code,
            data: message.into().into_bytes(),
            ..Record::new(MessageKind::Response)
        }
    }

    pub fn ok_response(message: impl Into<String>) -> Record {
        Record::response(ErrorCode::Success, message)
    }

    /// Builds an `ERROR` record for the sentence-write edit loop, which
    /// "returns one ERROR record per bad update and continues" (spec §7).
    pub fn error(error_code: ErrorCode, message: impl Into<String>) -> Record {
        Record {
            error_code,
            data: message.into().into_bytes(),
            ..Record::new(MessageKind::Error)
        }
    }

    pub fn data_as_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.data)
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        primitive::write_u32(out, self.kind as u32);
        primitive::write_u32(out, self.error_code as u32);
        primitive::write_string(out, &self.username);
        primitive::write_string(out, &self.filename);
        primitive::write_string(out, &self.target_user);
        primitive::write_i32(out, self.flags);
        primitive::write_i32(out, self.word_index);
        primitive::write_string(out, &self.ss_ip);
        primitive::write_u16(out, self.ss_port);
        primitive::write_bytes(out, &self.data);
    }

    pub fn decode(src: &mut &[u8]) -> Result<Record, DecodeError> {
        let kind = MessageKind::from_u32(primitive::read_u32(src)?)
            .ok_or(DecodeError::UnknownMessageKind)?;
        let error_code = ErrorCode::from_u32(primitive::read_u32(src)?)
            .ok_or(DecodeError::UnknownErrorCode)?;
        let username = primitive::read_string(src, crate::MAX_USERNAME_LEN)?;
        let filename = primitive::read_string(src, crate::MAX_FILENAME_LEN)?;
        let target_user = primitive::read_string(src, crate::MAX_USERNAME_LEN)?;
        let flags = primitive::read_i32(src)?;
        let word_index = primitive::read_i32(src)?;
        let ss_ip = primitive::read_string(src, 64)?;
        let ss_port = primitive::read_u16(src)?;
        let data = primitive::read_bytes(src, crate::MAX_RECORD_LEN)?;
        Ok(Record {
            kind,
            error_code,
            username,
            filename,
            target_user,
            flags,
            word_index,
            ss_ip,
            ss_port,
            data,
        })
    }
}

/// Errors that can occur while decoding a record body already read off the
/// wire. Distinct from [`crate::wire::WireError`], which covers the framing
/// (length prefix, socket I/O) layer around this codec.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("record truncated")]
    Truncated,
    #[error("record contains invalid utf-8")]
    InvalidUtf8,
    #[error("field exceeds its maximum length")]
    TooLong,
    #[error("unknown message kind")]
    UnknownMessageKind,
    #[error("unknown error code")]
    UnknownErrorCode,
}

impl From<primitive::PrimitiveError> for DecodeError {
    fn from(e: primitive::PrimitiveError) -> Self {
        match e {
            primitive::PrimitiveError::Truncated => DecodeError::Truncated,
            primitive::PrimitiveError::InvalidUtf8 => DecodeError::InvalidUtf8,
            primitive::PrimitiveError::TooLong => DecodeError::TooLong,
        }
    }
}
