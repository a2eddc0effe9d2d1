use clap::Parser;
use nameserver::config::{Cli, Config};
use nameserver::server;
use nameserver::state::NameServer;
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "nameserver=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::resolve(Cli::parse());

    if config.allow_exec {
        tracing::warn!("exec is enabled: file content will be run as a shell command on this host");
    }

    let server = NameServer::new(config.checkpoint.clone(), config.allow_exec).await?;
    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!(bind = %config.bind, "name server listening");

    server::serve_forever(listener, server).await
}
