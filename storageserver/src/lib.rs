//! DFS storage server: owns a range of files' bytes, the per-sentence
//! write protocol, and the undo shadow tree.

pub mod config;
pub mod locks;
pub mod registration;
pub mod sentence;
pub mod server;
pub mod session;
pub mod storage;
pub mod write_session;
