//! TCP accept loop and per-connection request dispatch (spec §5, §7).
//!
//! One task per accepted connection, detached (teacher's `handle_forever`
//! / `process_socket` split). The NM port accepts both clients and storage
//! servers; a connection's role isn't fixed up front, it's read off each
//! record's `kind` as it arrives.

use std::net::SocketAddr;
use std::sync::Arc;

use dfs_common::{ErrorCode, MessageKind, Record, WireError};
use tokio::net::{TcpListener, TcpStream};

use crate::ops;
use crate::state::NameServer;

pub async fn serve_forever(listener: TcpListener, server: Arc<NameServer>) -> std::io::Result<()> {
    loop {
        let (socket, peer) = listener.accept().await?;
        socket.set_nodelay(true)?;
        let server = Arc::clone(&server);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, peer, &server).await {
                tracing::debug!(%peer, error = %e, "connection closed");
            }
            server.sessions.remove(&peer);
        });
    }
}

async fn handle_connection(mut socket: TcpStream, peer: SocketAddr, server: &Arc<NameServer>) -> Result<(), WireError> {
    loop {
        let request = match dfs_common::read_record(&mut socket).await {
            Ok(record) => record,
            Err(WireError::Closed) => return Ok(()),
            Err(e) => return Err(e),
        };

        let response = dispatch(server, peer, &request).await;
        dfs_common::write_record(&mut socket, &response).await?;
    }
}

async fn dispatch(server: &Arc<NameServer>, peer: SocketAddr, record: &Record) -> Record {
    match record.kind {
        MessageKind::RegisterClient => ops::register_client(server, peer, record).await,
        MessageKind::RegisterSs => ops::register_ss(server, record).await,
        MessageKind::Heartbeat => ops::heartbeat(server, record).await,
        MessageKind::View => ops::view(server, record).await,
        MessageKind::Info => ops::info(server, record).await,
        MessageKind::Create => ops::create(server, record).await,
        MessageKind::Delete => ops::delete(server, record).await,
        MessageKind::AddAccess => ops::add_access(server, record).await,
        MessageKind::RemAccess => ops::rem_access(server, record).await,
        MessageKind::Read | MessageKind::Stream | MessageKind::Undo => ops::locate(server, record, false).await,
        MessageKind::Write => ops::locate(server, record, true).await,
        MessageKind::Exec => ops::exec(server, record).await,
        MessageKind::ListUsers => ops::list_users(server, record).await,
        other => Record::response(ErrorCode::InvalidCommand, format!("unexpected message kind on name server port: {other:?}")),
    }
}
