//! Report Export - command-line host
//!
//! Reads a JSON record collection, exports it through one of the entity
//! presets (or a report definition file) and prints the written paths.

mod args;
mod commands;

use args::Args;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let written = commands::run(args).await?;

    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}
