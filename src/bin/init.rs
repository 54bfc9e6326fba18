//! trackd_init - One-time database initialization tool
//!
//! Creates a fresh tracker database, optionally pre-seeded with the
//! stock template catalog.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// trackd database initialization tool
#[derive(Parser, Debug)]
#[command(
    name = "trackd_init",
    version,
    about = "Initialize a new trackd database"
)]
struct Args {
    /// Path to SQLite database file to create (must not exist)
    #[arg(short, long)]
    database: PathBuf,

    /// Skip seeding the stock categories and enemy templates
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trackd=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    trackd::init::init_database(&args.database, !args.no_seed).await?;

    Ok(())
}
