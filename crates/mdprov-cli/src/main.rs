//! mdprov CLI - permanent provenance for markdown documents

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

/// Record markdown documents on a permanent ledger, once per content id
#[derive(Parser)]
#[command(name = "mdprov")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a document unless its content is already recorded
    Upload {
        /// Markdown file to upload
        file: PathBuf,
        /// Author tag (default: MP_AUTHOR)
        #[arg(long)]
        author: Option<String>,
        /// Record this name instead of the file's own
        #[arg(long)]
        file_name: Option<String>,
        /// Where the content came from, recorded as a Source tag
        #[arg(long)]
        source: Option<String>,
    },
    /// Publish the index document and point the registered name at it
    Index,
    /// List recorded uploads, newest first
    History {
        /// Number of records to show (default: all)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the content id of a file without uploading it
    Cid {
        /// File to identify
        file: PathBuf,
    },
    /// Write a new signing key (an Arweave RSA wallet by default)
    Keygen {
        /// Destination (default: ./wallet.json)
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
        /// Write an Ed25519 key instead of an RSA wallet
        #[arg(long)]
        ed25519: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload {
            file,
            author,
            file_name,
            source,
        } => cmd::upload::run(&file, author, file_name, source).await,
        Commands::Index => cmd::index::run().await,
        Commands::History { limit } => cmd::history::run(limit).await,
        Commands::Cid { file } => cmd::cid::run(&file).await,
        Commands::Keygen {
            path,
            force,
            ed25519,
        } => cmd::keygen::run(
            path.unwrap_or_else(|| PathBuf::from("wallet.json")),
            force,
            ed25519,
        ),
    }
}
