use std::sync::Arc;

use clap::Parser;
use storageserver::config::{Cli, Config};
use storageserver::locks::LockTable;
use storageserver::registration;
use storageserver::server;
use storageserver::storage::Storage;
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "storageserver=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::resolve(Cli::parse());
    std::fs::create_dir_all(&config.storage_root)?;
    std::fs::create_dir_all(&config.shadow_root)?;

    let storage = Arc::new(Storage::new(config.storage_root.clone(), config.shadow_root.clone()));
    let locks = Arc::new(LockTable::new());

    let client_listener = TcpListener::bind(config.client_bind).await?;
    let nm_listener = TcpListener::bind(config.nm_bind).await?;
    tracing::info!(client = %config.client_bind, nm = %config.nm_bind, "storage server listening");

    let ss_index = match registration::register(config.name_server, &config.client_bind.ip().to_string(), config.nm_bind.port(), config.client_bind.port(), &storage).await {
        Ok(index) => index,
        Err(e) => {
            tracing::warn!(error = %e, "could not reach name server at startup; continuing unregistered");
            -1
        }
    };
    if ss_index >= 0 {
        registration::spawn_heartbeat_loop(config.name_server, ss_index);
    }

    tokio::try_join!(
        server::serve_client_port(client_listener, Arc::clone(&storage), locks),
        server::serve_nm_port(nm_listener, storage),
    )?;
    Ok(())
}
