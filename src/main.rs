//! barkartan - Main entry point
//!
//! Parses the CLI and runs one pipeline pass. All real work lives in the
//! library; this binary only wires up logging and dispatch.

use anyhow::Result;
use barkartan::cli::{self, Cli};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "barkartan=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Cli::parse();

    info!("Starting barkartan v{}", env!("CARGO_PKG_VERSION"));

    cli::run(args).await
}
