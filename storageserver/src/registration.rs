//! SS-initiated registration and heartbeat (spec §4.7). The SS is the
//! client here: it opens outbound connections to the NM, unlike the
//! listener loops in [`crate::server`].

use std::net::SocketAddr;
use std::time::Duration;

use dfs_common::{MessageKind, Record, WireError};
use tokio::net::TcpStream;

use crate::storage::Storage;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

/// Scans the storage root, sends `REGISTER_SS` with the inventory, and
/// returns the registry index the NM assigned (needed for subsequent
/// heartbeats).
pub async fn register(nm_addr: SocketAddr, ip: &str, nm_facing_port: u16, client_facing_port: u16, storage: &Storage) -> Result<i32, WireError> {
    let inventory = storage.inventory().await.map_err(|e| WireError::Io(std::io::Error::other(e.to_string())))?;

    let mut req = Record::new(MessageKind::RegisterSs);
    req.ss_ip = ip.to_owned();
    req.ss_port = nm_facing_port;
    req.word_index = client_facing_port as i32;
    req.data = inventory.join("\n").into_bytes();

    let mut stream = TcpStream::connect(nm_addr).await?;
    dfs_common::write_record(&mut stream, &req).await?;
    let response = dfs_common::read_record(&mut stream).await?;

    if !response.error_code.is_success() {
        tracing::warn!(message = response.data_as_str().unwrap_or("<invalid utf-8>"), "registration rejected by name server");
    } else {
        tracing::info!(ss_index = response.word_index, "registered with name server");
    }
    Ok(response.word_index)
}

/// Spawns the background task that sends a HEARTBEAT every ten seconds.
/// Failures are logged and ignored (spec §4.7, §7: "heartbeat failures
/// are logged and ignored").
pub fn spawn_heartbeat_loop(nm_addr: SocketAddr, ss_index: i32) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
        ticker.tick().await; // first tick fires immediately; skip it
        loop {
            ticker.tick().await;
            if let Err(e) = send_heartbeat(nm_addr, ss_index).await {
                tracing::debug!(error = %e, "heartbeat failed");
            }
        }
    });
}

async fn send_heartbeat(nm_addr: SocketAddr, ss_index: i32) -> Result<(), WireError> {
    let mut stream = TcpStream::connect(nm_addr).await?;
    let mut req = Record::new(MessageKind::Heartbeat);
    req.flags = ss_index;
    dfs_common::write_record(&mut stream, &req).await
}
