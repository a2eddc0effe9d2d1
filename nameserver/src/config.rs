//! Startup configuration: CLI flags layered over an optional TOML file,
//! following the client's `Config::default()` + file-overlay pattern.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "nameserver", about = "DFS name server")]
pub struct Cli {
    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,

    #[arg(long)]
    pub bind: Option<SocketAddr>,

    #[arg(long)]
    pub checkpoint: Option<PathBuf>,

    /// Enables the `exec` operation. Off by default: it runs a file's
    /// content as a shell command on the name server host (spec §4.3).
    #[arg(long)]
    pub allow_exec: bool,
}

#[derive(Deserialize, Debug, Clone, Default)]
struct FileConfig {
    bind: Option<SocketAddr>,
    checkpoint: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub checkpoint: PathBuf,
    pub allow_exec: bool,
}

impl Config {
    /// CLI flags win over the config file; both fall back to hardcoded
    /// defaults so the name server can start with zero setup.
    pub fn resolve(cli: Cli) -> Config {
        let file: FileConfig = std::fs::read_to_string(&cli.config)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default();

        let bind = cli
            .bind
            .or(file.bind)
            .unwrap_or_else(|| "127.0.0.1:9000".parse().unwrap());
        let checkpoint = cli
            .checkpoint
            .or(file.checkpoint)
            .unwrap_or_else(|| PathBuf::from("nameserver.checkpoint"));

        Config { bind, checkpoint, allow_exec: cli.allow_exec }
    }
}
