// llmbench-smoke
//
// Connectivity check: one short request through the configured provider.
// Exits 1 when the call fails.

use anyhow::{Context, Result};
use llmbench::create_invoker;
use llmbench_core::BenchConfig;

const SMOKE_PROMPT: &str = "Hello";
const SMOKE_MAX_TOKENS: u32 = 10;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "llmbench_core=info,llmbench_smoke=info".into()),
        )
        .init();

    let config = BenchConfig::from_env().context("Failed to load configuration")?;
    let invoker = create_invoker(&config).context("Failed to create completion driver")?;

    tracing::info!(
        provider = %invoker.provider(),
        model = %invoker.model(),
        "Sending smoke request"
    );
    let record = invoker.invoke(SMOKE_PROMPT, Some(SMOKE_MAX_TOKENS)).await;

    println!("success: {}", record.success);
    println!("latency: {:.3}s", record.latency);
    println!("model: {}", record.model);
    if let Some(response) = &record.response {
        println!("response: {}", response);
    }
    if let Some(error) = &record.error {
        println!("error: {}", error);
    }

    if !record.success {
        std::process::exit(1);
    }
    Ok(())
}
