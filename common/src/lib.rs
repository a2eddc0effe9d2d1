//! Wire types and framing shared by the name server, storage servers, and
//! clients of the distributed file system.
//!
//! A single [`message::Record`] shape carries every interaction on the wire,
//! tagged by [`message::MessageKind`] and framed by a 4-byte length prefix
//! (see [`wire`]).

pub mod access;
pub mod message;
pub mod primitive;
pub mod wire;

pub use access::AccessRight;
pub use message::{ErrorCode, MessageKind, Record};
pub use wire::{read_record, write_record, WireError};

/// Ceiling on a single record's encoded body, matching `MAX_BUFFER_SIZE` in
/// the original `common.h`. Guards against a corrupt or hostile length
/// prefix forcing an unbounded allocation.
pub const MAX_RECORD_LEN: usize = 1 << 20;

/// Ceiling on username length (`MAX_USERNAME` in the original source).
pub const MAX_USERNAME_LEN: usize = 64;

/// Ceiling on filename length (`MAX_FILENAME` in the original source).
pub const MAX_FILENAME_LEN: usize = 256;

/// The literal sentinel that terminates a write session's edit loop.
pub const WRITE_SENTINEL: &str = "ETIRW";

/// The literal sentinel that closes a stream.
pub const STREAM_STOP: &str = "STOP";
