use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "glowstore")]
#[command(version, about = "Storefront API for the Glowing cosmetics shop")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the SQLite database file. Overrides STORE_DB.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Port to listen on. Overrides STORE_PORT.
        #[arg(short, long)]
        port: Option<u16>,
        /// Relax cookie security and allow cross-origin requests
        #[arg(long)]
        dev: bool,
    },
    /// Create the database and run migrations
    InitDb,
    /// Populate the database with the admin account and starter catalog
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "glowstore=debug,tower_http=debug"
    } else {
        "glowstore=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let mut config = glowstore::config::Config::load();
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    match cli.command {
        Commands::Serve { port, dev } => cmd::serve(config, port, dev).await,
        Commands::InitDb => cmd::init_db(&config),
        Commands::Seed => cmd::seed(&config),
    }
}
