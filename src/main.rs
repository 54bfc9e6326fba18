//! trackd - combat initiative tracker daemon

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use trackd::{Config, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Combat initiative tracker daemon
#[derive(Parser, Debug)]
#[command(name = "trackd", version, about = "Combat initiative tracker daemon")]
struct Args {
    /// Path to a TOML configuration file (defaults to ./trackd.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trackd=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    // Create and run server
    let server = Server::new(config).await?;
    server.run().await?;

    Ok(())
}
