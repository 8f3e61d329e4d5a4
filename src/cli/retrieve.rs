//! Retrieve command - one-shot hierarchical retrieval

use clap::Args;
use tracing::info;

use crate::config::Config;
use crate::error::RetrieveError;
use crate::retrieval::RetrievalPipeline;

#[derive(Args)]
pub struct RetrieveArgs {
    /// User query to search for
    pub query: String,

    /// Number of results to return (defaults to the configured top_n)
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Number of sub-questions to expand the query into
    #[arg(long)]
    pub n_questions: Option<usize>,

    /// Output format (text, json)
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// API key for the generative and embedding services
    #[arg(long, env = "OPENAI_API_KEY")]
    pub api_key: Option<String>,

    /// Pinecone API key
    #[arg(long, env = "PINECONE_API_KEY")]
    pub index_api_key: Option<String>,
}

pub async fn run(args: RetrieveArgs, _verbose: bool) -> anyhow::Result<()> {
    let mut config = Config::load();

    // CLI flags override the config file
    if let Some(key) = &args.api_key {
        config.expansion.api_key = Some(key.clone());
        config.embedding.api_key = Some(key.clone());
    }
    if let Some(key) = args.index_api_key {
        config.index.api_key = Some(key);
    }
    if let Some(n) = args.n_questions {
        config.expansion.n_questions = n;
    }

    let top_n = args.top_n.unwrap_or(config.retrieval.top_n);

    info!(
        "Retrieving top {} chunks ({} sub-questions)",
        top_n, config.expansion.n_questions
    );

    let pipeline = RetrievalPipeline::from_config(&config)?;

    let results = match pipeline.run(&args.query, top_n).await {
        Ok(results) => results,
        Err(e @ RetrieveError::Validation(_)) => anyhow::bail!("{}", e),
        Err(e) => anyhow::bail!("retrieval failed ({}): {}", e.kind(), e),
    };

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No matching context found for '{}'.", args.query);
        return Ok(());
    }

    println!("\nContext for '{}' (top {}):\n", args.query, results.len());

    for (i, result) in results.iter().enumerate() {
        println!(
            "{}. Score: {:.4}  (file {}, page {})",
            i + 1,
            result.score,
            result.file_id,
            result.page_id
        );

        // Truncate text for display
        let display_text = if result.chunk.len() > 200 {
            format!("{}...", &result.chunk[..200])
        } else {
            result.chunk.clone()
        };
        println!("   {}", display_text);
        println!();
    }

    Ok(())
}
