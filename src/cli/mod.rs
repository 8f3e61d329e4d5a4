//! CLI module - command definitions and handlers

mod config_cmd;
mod retrieve;
mod serve;

use clap::{Parser, Subcommand};

pub use config_cmd::ConfigArgs;
pub use retrieve::RetrieveArgs;
pub use serve::ServeArgs;

/// hirag - Hierarchical retrieval engine for document RAG
#[derive(Parser)]
#[command(name = "hirag")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Retrieve ranked context chunks for a query
    Retrieve(RetrieveArgs),

    /// Start HTTP API server
    Serve(ServeArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Retrieve(args) => retrieve::run(args, self.verbose).await,
            Commands::Serve(args) => serve::run(args, self.verbose).await,
            Commands::Config(args) => config_cmd::run(args).await,
        }
    }
}
