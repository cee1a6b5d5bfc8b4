//! sqlask HTTP server with OpenAI integration
//!
//! Accepts natural language questions about the sales dataset, converts them
//! to SQL using OpenAI, gates the SQL and executes it read-only on SQLite.

use std::sync::Arc;
use std::time::Duration;

use sqlask_core::{AskPipeline, GenerationSettings, Schema};
use sqlask_sqlite::{path_from_url, SqliteExecutor};
use tracing::info;

mod config;
mod llm;
mod logging;
mod metrics;
mod routes;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config_path =
        std::env::var("SQLASK_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let config = Config::load_or_default(&config_path)?;

    logging::init(&config.logging);
    info!(config = %config_path, "Configuration loaded");

    let api_key = Config::get_openai_api_key()?;
    info!("Using OpenAI model: {}", config.llm.model);

    let metrics = metrics::Metrics::new()
        .map_err(|e| anyhow::anyhow!("Failed to create metrics registry: {}", e))?;
    let oracle = llm::OpenAiOracle::new(api_key, Duration::from_secs(config.llm.timeout_secs))
        .with_latency_histogram(metrics.oracle_latency());

    // Prepare the data store: tables, optional demo rows, then read-only
    let executor = SqliteExecutor::open(path_from_url(&config.database.path))?;
    executor.init_schema()?;
    if config.database.seed_on_startup {
        executor.seed_demo_data()?;
    }
    executor.enforce_read_only()?;

    let pipeline = AskPipeline::new(
        Arc::new(oracle),
        Arc::new(executor),
        Schema::sales(),
        GenerationSettings::new(config.llm.model.clone(), config.llm.max_tokens),
    );
    let app = routes::router(routes::AppState::new(pipeline, metrics));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Starting sqlask server on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
