//! Config command - manage hirag configuration

use clap::{Args, Subcommand};

use crate::config::Config;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Initialize config file with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Show config file path
    Path,
}

pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommands::Show => {
            let config = Config::load();
            let path = Config::config_path();

            if path.exists() {
                println!("Config file: {}", path.display());
            } else {
                println!("Config file: {} (not found, using defaults)", path.display());
            }
            println!();
            println!("[expansion]");
            println!("provider = \"{}\"", config.expansion.provider);
            println!("model = \"{}\"", config.expansion.model);
            println!("n_questions = {}", config.expansion.n_questions);
            if config.expansion.api_key.is_some() {
                println!("api_key = \"***\"");
            }
            println!();
            println!("[embedding]");
            println!("provider = \"{}\"", config.embedding.provider);
            println!("model = \"{}\"", config.embedding.model);
            if config.embedding.api_key.is_some() {
                println!("api_key = \"***\"");
            }
            println!();
            println!("[index]");
            if let Some(host) = &config.index.question_host {
                println!("question_host = \"{}\"", host);
            }
            if let Some(host) = &config.index.chunk_host {
                println!("chunk_host = \"{}\"", host);
            }
            if config.index.api_key.is_some() {
                println!("api_key = \"***\"");
            }
            println!();
            println!("[retrieval]");
            println!("pages_per_question = {}", config.retrieval.pages_per_question);
            println!("max_pages = {}", config.retrieval.max_pages);
            println!("chunks_per_question = {}", config.retrieval.chunks_per_question);
            println!("top_n = {}", config.retrieval.top_n);
            println!("max_concurrency = {}", config.retrieval.max_concurrency);
            println!("deadline_secs = {}", config.retrieval.deadline_secs);
        }

        ConfigCommands::Init { force } => {
            let path = Config::config_path();

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }

            if force && path.exists() {
                std::fs::remove_file(&path)?;
            }

            Config::create_example_if_missing()?;
            println!("Created config file at {}", path.display());
            println!();
            println!("Set the index hosts and API keys before retrieving:");
            println!();
            println!("  [index]");
            println!("  question_host = \"https://questions-xxxx.svc.pinecone.io\"");
            println!("  chunk_host = \"https://chunks-xxxx.svc.pinecone.io\"");
            println!();
            println!("  # or set PINECONE_API_KEY / OPENAI_API_KEY env vars");
        }

        ConfigCommands::Path => {
            println!("{}", Config::config_path().display());
        }
    }

    Ok(())
}
