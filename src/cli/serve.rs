//! Serve command - HTTP API server

use clap::Args;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Enable CORS for all origins
    #[arg(long)]
    pub cors: bool,

    /// Pinecone API key
    #[arg(long, env = "PINECONE_API_KEY")]
    pub index_api_key: Option<String>,
}

#[cfg(feature = "server")]
pub async fn run(args: ServeArgs, _verbose: bool) -> anyhow::Result<()> {
    use std::sync::Arc;

    use axum::{routing::get, Router};
    use tower_http::cors::{Any, CorsLayer};
    use tracing::info;

    use crate::config::Config;
    use crate::retrieval::RetrievalPipeline;

    let mut config = Config::load();
    if let Some(key) = args.index_api_key {
        config.index.api_key = Some(key);
    }

    let default_top_n = config.retrieval.top_n;
    let pipeline = RetrievalPipeline::from_config(&config)?;

    info!(
        "Serving retrieval over {} sub-questions, default top_n {}",
        config.expansion.n_questions, default_top_n
    );

    // Shared state
    let state = Arc::new(AppState {
        pipeline,
        default_top_n,
    });

    // Build router
    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/retrieve", get(retrieve))
        .with_state(state);

    if args.cors {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    let addr = format!("{}:{}", args.host, args.port);
    println!("hirag server listening on http://{}", addr);
    println!("  GET  /retrieve - Retrieve context chunks for a query");
    println!("  GET  /health   - Health check");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(feature = "server")]
struct AppState {
    pipeline: crate::retrieval::RetrievalPipeline,
    default_top_n: usize,
}

#[cfg(feature = "server")]
async fn root() -> &'static str {
    "hirag API Server\n\nEndpoints:\n  GET /retrieve - Retrieve context chunks for a query\n  GET /health   - Health check\n"
}

#[cfg(feature = "server")]
async fn health() -> &'static str {
    "ok"
}

#[cfg(feature = "server")]
#[derive(serde::Deserialize)]
struct RetrieveParams {
    query: String,
    /// Signed so a negative value clamps to an empty result instead of
    /// rejecting the request
    top_n: Option<i64>,
}

#[cfg(feature = "server")]
#[derive(serde::Serialize)]
struct RetrieveResponse {
    results: Vec<crate::retrieval::RetrievalResult>,
}

#[cfg(feature = "server")]
#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

#[cfg(feature = "server")]
async fn retrieve(
    axum::extract::State(state): axum::extract::State<std::sync::Arc<AppState>>,
    axum::extract::Query(params): axum::extract::Query<RetrieveParams>,
) -> Result<axum::response::Json<RetrieveResponse>, (axum::http::StatusCode, axum::response::Json<ErrorBody>)> {
    use axum::http::StatusCode;

    use crate::error::RetrieveError;

    let top_n = params
        .top_n
        .map(|n| n.max(0) as usize)
        .unwrap_or(state.default_top_n);

    let results = state.pipeline.run(&params.query, top_n).await.map_err(|e| {
        let status = match e {
            RetrieveError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        };
        (
            status,
            axum::response::Json(ErrorBody {
                error: e.to_string(),
                kind: e.kind(),
            }),
        )
    })?;

    Ok(axum::response::Json(RetrieveResponse { results }))
}

#[cfg(not(feature = "server"))]
pub async fn run(_args: ServeArgs, _verbose: bool) -> anyhow::Result<()> {
    anyhow::bail!("Server feature not enabled. Rebuild with --features server")
}
