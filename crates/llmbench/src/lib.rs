// llmbench - benchmark pipeline
//
// Runs every scenario of the catalog through one invoker, logs per-provider
// statistics, and hands records and summaries to the reporter. Per-call
// failures live in the records; only reporter I/O errors end a run.

use std::path::PathBuf;

use llmbench_anthropic::AnthropicDriver;
use llmbench_bedrock::BedrockDriver;
use llmbench_core::error::Result;
use llmbench_core::{
    summarize, BenchConfig, BoxedCompletionDriver, GroupStats, Invoker, OutcomeRecord, Provider,
    ScenarioSummary, TrialRunner, GROUP_STATS_HEADER,
};
use llmbench_report::Reporter;

/// Create the completion driver for the configured provider
///
/// Credentials are read from the environment here; a missing key surfaces
/// as a failed record on every call, not as an error.
pub fn create_driver(config: &BenchConfig) -> Result<BoxedCompletionDriver> {
    match config.provider {
        Provider::Anthropic => {
            let driver = AnthropicDriver::from_env(config.model.clone(), config.timeout)?;
            let driver = match &config.anthropic_base_url {
                Some(base) => driver.with_api_url(format!("{}/v1/messages", base.trim_end_matches('/'))),
                None => driver,
            };
            Ok(Box::new(driver))
        }
        Provider::Bedrock => Ok(Box::new(BedrockDriver::from_config(config)?)),
    }
}

/// Build the invoker around the configured provider's driver
pub fn create_invoker(config: &BenchConfig) -> Result<Invoker> {
    Ok(Invoker::from_boxed(create_driver(config)?))
}

/// Result of a complete run
#[derive(Debug)]
pub struct RunOutcome {
    /// One row per scenario that produced records, in catalog order
    pub summaries: Vec<ScenarioSummary>,
    /// Summary CSV, absent when no scenario produced records
    pub summary_path: Option<PathBuf>,
    pub combined_chart: Option<PathBuf>,
}

/// One benchmark run over the configured catalog
pub struct BenchmarkRun {
    config: BenchConfig,
    runner: TrialRunner,
    reporter: Reporter,
}

impl BenchmarkRun {
    pub fn new(config: BenchConfig, invoker: Invoker, reporter: Reporter) -> Self {
        let runner = TrialRunner::new(&config, invoker);
        Self {
            config,
            runner,
            reporter,
        }
    }

    /// Run all scenarios sequentially and write the artifacts
    pub async fn execute(&self) -> Result<RunOutcome> {
        tracing::info!(
            provider = %self.runner.invoker().provider(),
            model = %self.runner.invoker().model(),
            scenarios = self.config.scenarios.len(),
            iterations = self.config.iterations,
            concurrency = self.config.concurrency,
            "Starting benchmark run"
        );

        let mut summaries = Vec::new();
        let mut all_records: Vec<(String, Vec<OutcomeRecord>)> = Vec::new();

        for scenario in &self.config.scenarios {
            let records = self.runner.run_scenario(scenario).await;

            let Some(report) = summarize(&scenario.name, &records) else {
                tracing::warn!(scenario = %scenario.name, "No results for scenario, skipping");
                continue;
            };

            log_group_stats(&scenario.name, &report.groups);
            self.reporter.render_scenario_chart(&scenario.name, &records)?;

            summaries.push(report.summary);
            all_records.push((scenario.name.clone(), records));
        }

        if summaries.is_empty() {
            tracing::warn!("No scenario produced results; nothing written");
            return Ok(RunOutcome {
                summaries,
                summary_path: None,
                combined_chart: None,
            });
        }

        let summary_path = self.reporter.write_summary(&summaries)?;
        let combined_chart = self.reporter.render_combined_chart(&all_records)?;

        Ok(RunOutcome {
            summaries,
            summary_path: Some(summary_path),
            combined_chart: Some(combined_chart),
        })
    }
}

fn log_group_stats(scenario: &str, groups: &[GroupStats]) {
    tracing::info!("Statistics for {}:", scenario);
    tracing::info!("{}", GROUP_STATS_HEADER);
    for group in groups {
        tracing::info!("{}", group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmbench_core::CompletionDriver;
    use std::time::Duration;

    #[test]
    fn test_create_invoker_follows_provider() {
        let config = BenchConfig {
            provider: Provider::Bedrock,
            bedrock_model_id: "arn:model".to_string(),
            ..BenchConfig::default()
        };
        let invoker = create_invoker(&config).unwrap();
        assert_eq!(invoker.provider(), Provider::Bedrock);
        assert_eq!(invoker.model(), "arn:model");

        let config = BenchConfig {
            model: "claude-test".to_string(),
            timeout: Duration::from_secs(5),
            ..BenchConfig::default()
        };
        let invoker = create_invoker(&config).unwrap();
        assert_eq!(invoker.provider(), Provider::Anthropic);
        assert_eq!(invoker.model(), "claude-test");
    }

    #[test]
    fn test_create_driver_applies_endpoint_overrides() {
        let config = BenchConfig {
            anthropic_base_url: Some("http://localhost:8080/".to_string()),
            ..BenchConfig::default()
        };
        let driver = create_driver(&config).unwrap();
        assert_eq!(driver.provider(), Provider::Anthropic);
        assert_eq!(driver.model(), config.model);

        let config = BenchConfig {
            provider: Provider::Bedrock,
            bedrock_endpoint: Some("http://localhost:9090".to_string()),
            ..BenchConfig::default()
        };
        let driver = create_driver(&config).unwrap();
        assert_eq!(driver.provider(), Provider::Bedrock);
        assert_eq!(driver.model(), config.bedrock_model_id);
    }
}
