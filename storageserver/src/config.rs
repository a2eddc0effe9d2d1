//! Startup configuration for the storage server (spec §4.7, §6: client and
//! NM-facing ports are both configurable).

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "storageserver", about = "DFS storage server")]
pub struct Cli {
    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,

    #[arg(long)]
    pub name_server: Option<SocketAddr>,

    #[arg(long)]
    pub client_bind: Option<SocketAddr>,

    #[arg(long)]
    pub nm_bind: Option<SocketAddr>,

    #[arg(long)]
    pub storage_root: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone, Default)]
struct FileConfig {
    name_server: Option<SocketAddr>,
    client_bind: Option<SocketAddr>,
    nm_bind: Option<SocketAddr>,
    storage_root: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub name_server: SocketAddr,
    pub client_bind: SocketAddr,
    pub nm_bind: SocketAddr,
    pub storage_root: PathBuf,
    pub shadow_root: PathBuf,
}

impl Config {
    pub fn resolve(cli: Cli) -> Config {
        let file: FileConfig = std::fs::read_to_string(&cli.config)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default();

        let name_server = cli
            .name_server
            .or(file.name_server)
            .unwrap_or_else(|| "127.0.0.1:9000".parse().unwrap());
        let client_bind = cli
            .client_bind
            .or(file.client_bind)
            .unwrap_or_else(|| "127.0.0.1:9100".parse().unwrap());
        let nm_bind = cli
            .nm_bind
            .or(file.nm_bind)
            .unwrap_or_else(|| "127.0.0.1:9101".parse().unwrap());
        let storage_root = cli.storage_root.or(file.storage_root).unwrap_or_else(|| PathBuf::from("storage"));
        let shadow_root = storage_root.with_file_name(format!(
            "{}-shadow",
            storage_root.file_name().and_then(|n| n.to_str()).unwrap_or("storage")
        ));

        Config { name_server, client_bind, nm_bind, storage_root, shadow_root }
    }
}
