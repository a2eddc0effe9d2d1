//! Ephemeral per-connection client session table (spec §3).

use std::net::SocketAddr;
use std::time::Instant;

use dashmap::DashMap;

#[derive(Debug, Clone)]
pub struct ClientSession {
    pub username: String,
    pub peer: SocketAddr,
    pub connected_at: Instant,
}

/// Discarded on disconnect; purely informational (used to answer
/// `list-users`' "connected users" component).
#[derive(Debug, Default)]
pub struct ClientSessionTable {
    sessions: DashMap<SocketAddr, ClientSession>,
}

impl ClientSessionTable {
    pub fn new() -> ClientSessionTable {
        ClientSessionTable::default()
    }

    pub fn register(&self, peer: SocketAddr, username: String) {
        self.sessions.insert(peer, ClientSession { username, peer, connected_at: Instant::now() });
    }

    pub fn remove(&self, peer: &SocketAddr) {
        self.sessions.remove(peer);
    }

    pub fn usernames(&self) -> Vec<String> {
        self.sessions.iter().map(|entry| entry.value().username.clone()).collect()
    }
}
