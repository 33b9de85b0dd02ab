// Benchmark configuration
//
// BenchConfig is built once at process start and passed by reference into
// the runner, the drivers and the reporter. Values come from environment
// variables with the defaults below.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{BenchError, Result};
use crate::outcome::Provider;
use crate::scenario::{default_catalog, load_catalog, validate_catalog, Scenario};

pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-latest";
pub const DEFAULT_BEDROCK_MODEL_ID: &str =
    "arn:aws:bedrock:us-east-1::foundation-model/anthropic.claude-3-7-sonnet-latest";
pub const DEFAULT_BEDROCK_REGION: &str = "us-east-1";

/// Immutable benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Sequential iterations per scenario
    pub iterations: usize,
    /// Concurrent invocations per iteration
    pub concurrency: usize,
    /// Per-call timeout enforced by the HTTP client
    pub timeout: Duration,
    /// Model identifier for the direct completion API
    pub model: String,
    /// Active backend
    pub provider: Provider,
    pub scenarios: Vec<Scenario>,
    pub output_dir: PathBuf,
    pub chart_dir: PathBuf,
    /// Declared but never exercised; calls are not retried
    pub max_retries: u32,
    /// Declared but never exercised; calls are not retried
    pub retry_delay: Duration,
    /// Model resource identifier for the managed runtime
    pub bedrock_model_id: String,
    pub bedrock_region: String,
    /// Overrides the regional managed-runtime endpoint
    pub bedrock_endpoint: Option<String>,
    /// Overrides the Messages API host (`/v1/messages` is appended)
    pub anthropic_base_url: Option<String>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            iterations: 1,
            concurrency: 1,
            timeout: Duration::from_secs(30),
            model: DEFAULT_MODEL.to_string(),
            provider: Provider::Anthropic,
            scenarios: default_catalog(),
            output_dir: PathBuf::from("test_results"),
            chart_dir: PathBuf::from("charts"),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            bedrock_model_id: DEFAULT_BEDROCK_MODEL_ID.to_string(),
            bedrock_region: DEFAULT_BEDROCK_REGION.to_string(),
            bedrock_endpoint: None,
            anthropic_base_url: None,
        }
    }
}

impl BenchConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `LLMBENCH_ITERATIONS`, `LLMBENCH_CONCURRENCY`: trial shape (default 1 x 1)
    /// - `LLMBENCH_TIMEOUT_SECS`: per-call timeout (default 30)
    /// - `LLMBENCH_MODEL`: direct API model id
    /// - `LLMBENCH_PROVIDER`: `anthropic` or `bedrock`
    /// - `LLMBENCH_SCENARIOS`: path to a YAML scenario file
    /// - `LLMBENCH_OUTPUT_DIR`, `LLMBENCH_CHART_DIR`: artifact directories
    /// - `LLMBENCH_MAX_RETRIES`, `LLMBENCH_RETRY_DELAY_SECS`: declared, unused
    /// - `LLMBENCH_BEDROCK_MODEL_ID`, `LLMBENCH_BEDROCK_REGION`, `LLMBENCH_BEDROCK_ENDPOINT`
    /// - `ANTHROPIC_BASE_URL`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let scenarios = match get("LLMBENCH_SCENARIOS") {
            Some(path) => load_catalog(path.trim())?,
            None => defaults.scenarios,
        };

        let provider = match get("LLMBENCH_PROVIDER") {
            Some(value) => value.parse()?,
            None => defaults.provider,
        };

        Ok(Self {
            iterations: parse_var(&get, "LLMBENCH_ITERATIONS")?.unwrap_or(defaults.iterations),
            concurrency: parse_var(&get, "LLMBENCH_CONCURRENCY")?.unwrap_or(defaults.concurrency),
            timeout: parse_var(&get, "LLMBENCH_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            model: get("LLMBENCH_MODEL").unwrap_or(defaults.model),
            provider,
            scenarios,
            output_dir: get("LLMBENCH_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            chart_dir: get("LLMBENCH_CHART_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.chart_dir),
            max_retries: parse_var(&get, "LLMBENCH_MAX_RETRIES")?.unwrap_or(defaults.max_retries),
            retry_delay: parse_var(&get, "LLMBENCH_RETRY_DELAY_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.retry_delay),
            bedrock_model_id: get("LLMBENCH_BEDROCK_MODEL_ID").unwrap_or(defaults.bedrock_model_id),
            bedrock_region: get("LLMBENCH_BEDROCK_REGION").unwrap_or(defaults.bedrock_region),
            bedrock_endpoint: get("LLMBENCH_BEDROCK_ENDPOINT"),
            anthropic_base_url: get("ANTHROPIC_BASE_URL"),
        })
    }

    /// Check the configuration before any request is sent
    pub fn validate(&self) -> Result<()> {
        validate_catalog(&self.scenarios)?;
        if self.model.trim().is_empty() {
            return Err(BenchError::config("model identifier must not be empty"));
        }
        if self.provider == Provider::Bedrock && self.bedrock_model_id.trim().is_empty() {
            return Err(BenchError::config("bedrock model id must not be empty"));
        }
        if self.timeout.is_zero() {
            return Err(BenchError::config("timeout must be greater than zero"));
        }
        if self.trials_per_scenario().is_none() {
            return Err(BenchError::config(format!(
                "iterations ({}) x concurrency ({}) overflows",
                self.iterations, self.concurrency
            )));
        }
        Ok(())
    }

    /// Records expected per scenario; `None` when the product overflows
    pub fn trials_per_scenario(&self) -> Option<usize> {
        self.iterations.checked_mul(self.concurrency)
    }

    /// Set the trial shape
    pub fn with_trials(mut self, iterations: usize, concurrency: usize) -> Self {
        self.iterations = iterations;
        self.concurrency = concurrency;
        self
    }

    /// Replace the scenario catalog
    pub fn with_scenarios(mut self, scenarios: Vec<Scenario>) -> Self {
        self.scenarios = scenarios;
        self
    }

    /// Set the artifact directories
    pub fn with_dirs(mut self, output_dir: impl Into<PathBuf>, chart_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self.chart_dir = chart_dir.into();
        self
    }
}

fn parse_var<T, G>(get: &G, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| BenchError::config(format!("{}='{}': {}", key, raw, e)))
        })
        .transpose()
}
