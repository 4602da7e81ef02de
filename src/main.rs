use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::sync::Arc;
use tracing::{error, info};

use job_recommender::cli::{self, Cli, Command};
use job_recommender::config::Config;
use job_recommender::logging;
use job_recommender::metrics::MetricsRegistry;
use job_recommender::recommend::Recommender;
use job_recommender::server::{self, AppState};
use job_recommender::shared;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    logging::init_tracing("job-recommender", config.log_dir.as_deref());
    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting job-recommender"
    );

    if let Err(err) = run(cli, config).await {
        error!(error = %err, "job-recommender exited with error");
        return Err(err);
    }
    Ok(())
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let paths = config.artifact_paths();
    // Loading reads files and may initialize ONNX Runtime.
    let recommender = tokio::task::spawn_blocking(move || {
        shared::init_global(|| Recommender::load(&paths))
    })
    .await
    .context("Catalog loading task failed")?
    .context("Failed to load job catalog")?;

    match cli.command {
        Command::Recommend {
            text,
            top_k,
            threshold,
            json,
        } => {
            let query = if text.is_empty() {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read query from stdin")?;
                buf
            } else {
                text.join(" ")
            };
            let options = cli::merge_options(config.recommend_options(), top_k, threshold);
            let results = recommender.recommend(&query, options)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print!("{}", cli::format_recommendations(&results));
            }
        }
        Command::Serve { addr } => {
            let metrics = Arc::new(MetricsRegistry::new().context("Failed to create metrics")?);
            let state = AppState::new(recommender, metrics, config.recommend_options());
            server::serve(state, addr.unwrap_or(config.serve_addr)).await?;
        }
    }
    Ok(())
}
