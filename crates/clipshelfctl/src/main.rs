//! clipshelfctl: Command-line interface for Clipshelf clip databases.
//!
//! Provides commands for saving, listing and deleting clips from the
//! terminal, against the same database a clipping front end uses.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clipshelf::observability::tracing::init_tracing;
use clipshelf::{ClipId, ClipStore, StoreConfig};

/// Command-line interface for Clipshelf clip databases.
#[derive(Parser)]
#[command(name = "clipshelfctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    store: StoreConfig,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    output: OutputFormat,

    /// Emit logs as JSON lines
    #[arg(long, env = "CLIPSHELF_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Save a page as a new clip
    Add {
        /// Page title
        title: String,
        /// Source URL
        url: String,
        /// Page text (or use --file, or pipe it on stdin)
        content: Option<String>,
        /// Read page text from file
        #[arg(short, long)]
        file: Option<String>,
        /// Creation time (RFC 3339); defaults to now
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// List saved clips, newest first
    List,
    /// Delete one clip by id
    Delete {
        /// Clip id
        id: ClipId,
    },
    /// Delete every clip
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Quiet by default; RUST_LOG=clipshelf=debug shows store activity
    init_tracing("warn", cli.log_json);

    let store = ClipStore::new(cli.store);
    store.init().await.context("failed to open clip database")?;

    let result = match cli.command {
        Commands::Add {
            title,
            url,
            content,
            file,
            timestamp,
        } => commands::add::run(&store, title, url, content, file, timestamp, cli.output).await,
        Commands::List => commands::list::run(&store, cli.output).await,
        Commands::Delete { id } => commands::delete::run(&store, id, cli.output).await,
        Commands::Clear => commands::clear::run(&store, cli.output).await,
    };

    store.shutdown().await.context("failed to close clip database")?;
    result
}
