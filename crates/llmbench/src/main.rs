// llmbench
//
// Batch benchmark: reads configuration from the environment (and .env),
// runs every scenario against the configured provider and writes the
// summary CSV and charts.

use anyhow::{Context, Result};
use llmbench::{create_invoker, BenchmarkRun};
use llmbench_core::BenchConfig;
use llmbench_report::Reporter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "llmbench=info,llmbench_core=info,llmbench_report=info,llmbench_anthropic=info,llmbench_bedrock=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = dotenv {
        tracing::info!("Loaded .env from {:?}", path);
    }

    let config = BenchConfig::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    tracing::info!(
        max_retries = config.max_retries,
        retry_delay_secs = config.retry_delay.as_secs(),
        "Retry settings are recorded but calls are never retried"
    );

    let invoker = create_invoker(&config).context("Failed to create completion driver")?;
    let reporter = Reporter::new(&config.output_dir, &config.chart_dir, config.provider)
        .context("Failed to create output directories")?;

    let run = BenchmarkRun::new(config, invoker, reporter);
    let outcome = run.execute().await.context("Benchmark run failed")?;

    match &outcome.summary_path {
        Some(path) => tracing::info!(
            scenarios = outcome.summaries.len(),
            summary = %path.display(),
            "Benchmark complete"
        ),
        None => tracing::warn!("Benchmark complete without results"),
    }

    Ok(())
}
