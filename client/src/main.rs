//! Thin command-line front end over [`client::DfsClient`]. One invocation,
//! one operation, then exit — not an interactive shell (menu rendering and
//! a REPL command loop are out of scope).

use std::net::SocketAddr;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use client::{ClientError, DfsClient};
use dfs_common::AccessRight;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "dfs-client", about = "Distributed file system client")]
struct Cli {
    #[arg(long, default_value = "127.0.0.1:9000")]
    name_server: SocketAddr,

    #[arg(long)]
    user: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// VIEW [-a][-l]
    View {
        #[arg(short = 'a', long)]
        all: bool,
        #[arg(short = 'l', long)]
        long: bool,
    },
    /// READ f
    Read { file: String },
    /// CREATE f
    Create { file: String },
    /// WRITE f n [--edit "<word_index> <content>" ...]
    Write {
        file: String,
        sentence: i32,
        #[arg(long = "edit")]
        edits: Vec<String>,
    },
    /// DELETE f
    Delete { file: String },
    /// INFO f
    Info { file: String },
    /// STREAM f
    Stream { file: String },
    /// LIST
    ListUsers,
    /// ADDACCESS -R|-W f u
    AddAccess {
        file: String,
        user: String,
        #[arg(long, value_enum, default_value = "read")]
        mode: AccessMode,
    },
    /// REMACCESS f u
    RemAccess { file: String, user: String },
    /// EXEC f
    Exec { file: String },
    /// UNDO f
    Undo { file: String },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum AccessMode {
    Read,
    Write,
    ReadWrite,
}

impl From<AccessMode> for AccessRight {
    fn from(mode: AccessMode) -> AccessRight {
        match mode {
            AccessMode::Read => AccessRight::READ,
            AccessMode::Write => AccessRight::WRITE,
            AccessMode::ReadWrite => AccessRight::READ_WRITE,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "dfs_client=warn".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ClientError> {
    let dfs = DfsClient::connect(cli.name_server, cli.user).await?;

    match cli.command {
        Command::View { all, long } => println!("{}", dfs.view(all, long).await?),
        Command::Read { file } => {
            let bytes = dfs.read(&file).await?;
            println!("{}", String::from_utf8_lossy(&bytes));
        }
        Command::Create { file } => println!("{}", dfs.create(&file).await?),
        Command::Write { file, sentence, edits } => {
            let mut session = dfs.open_write_session(&file, sentence).await?;
            for edit in edits {
                let (index, content) = edit.split_once(' ').unwrap_or((edit.as_str(), ""));
                let word_index: i32 = index.parse().unwrap_or(0);
                session.edit(word_index, content).await?;
            }
            println!("{}", session.commit().await?);
        }
        Command::Delete { file } => println!("{}", dfs.delete(&file).await?),
        Command::Info { file } => println!("{}", dfs.info(&file).await?),
        Command::Stream { file } => {
            for token in dfs.stream(&file).await? {
                println!("{token}");
            }
        }
        Command::ListUsers => println!("{}", dfs.list_users().await?),
        Command::AddAccess { file, user, mode } => println!("{}", dfs.add_access(&file, &user, mode.into()).await?),
        Command::RemAccess { file, user } => println!("{}", dfs.rem_access(&file, &user).await?),
        Command::Exec { file } => println!("{}", dfs.exec(&file).await?),
        Command::Undo { file } => println!("{}", dfs.undo(&file).await?),
    }

    Ok(())
}
