//! DFS name server: the metadata/namespace authority for the distributed
//! file system. Owns file metadata, the storage-server registry, and the
//! two-phase locate-then-redirect protocol clients use to reach their data.

pub mod config;
pub mod error;
pub mod metadata;
pub mod ops;
pub mod persistence;
pub mod registry;
pub mod server;
pub mod sessions;
pub mod ss_link;
pub mod state;
