//! hirag - Hierarchical retrieval engine for document RAG
//!
//! A single-binary CLI for querying pre-built question and chunk indexes
//! with query expansion, page narrowing, and score-based reranking.

mod cli;
mod config;
mod embedding;
mod error;
mod expand;
mod http;
mod index;
mod llm;
mod retrieval;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hirag=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Parse CLI args and run
    let cli = Cli::parse();
    cli.run().await
}
