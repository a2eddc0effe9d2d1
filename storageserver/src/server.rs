//! Two independent TCP accept loops: the client-facing port and the
//! NM-facing port (spec §6). One task per accepted connection, detached,
//! mirroring the teacher's `handle_forever` / `process_socket` split.

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::locks::LockTable;
use crate::session;
use crate::storage::Storage;

pub async fn serve_client_port(listener: TcpListener, storage: Arc<Storage>, locks: Arc<LockTable>) -> std::io::Result<()> {
    loop {
        let (mut socket, peer) = listener.accept().await?;
        socket.set_nodelay(true)?;
        let storage = Arc::clone(&storage);
        let locks = Arc::clone(&locks);
        tokio::spawn(async move {
            let request = match dfs_common::read_record(&mut socket).await {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!(%peer, error = %e, "failed to read request on client port");
                    return;
                }
            };
            if let Err(e) = session::handle_client_request(&storage, &locks, &mut socket, request).await {
                tracing::debug!(%peer, error = %e, "client session ended");
            }
        });
    }
}

pub async fn serve_nm_port(listener: TcpListener, storage: Arc<Storage>) -> std::io::Result<()> {
    loop {
        let (mut socket, peer) = listener.accept().await?;
        socket.set_nodelay(true)?;
        let storage = Arc::clone(&storage);
        tokio::spawn(async move {
            let request = match dfs_common::read_record(&mut socket).await {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!(%peer, error = %e, "failed to read request on name server port");
                    return;
                }
            };
            if let Err(e) = session::handle_nm_request(&storage, &mut socket, request).await {
                tracing::debug!(%peer, error = %e, "name server session ended");
            }
        });
    }
}
