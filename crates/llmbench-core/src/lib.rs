// Benchmark core
//
// DB-free, HTTP-free building blocks of the latency harness:
// - Scenario catalog and BenchConfig, built once at startup
// - CompletionDriver trait implemented by each backend crate
// - Invoker that times one call and captures failures as records
// - TrialRunner that repeats concurrent batches per scenario
// - Aggregation into per-provider statistics and summary rows

pub mod aggregate;
pub mod config;
pub mod error;
pub mod invoker;
pub mod outcome;
pub mod runner;
pub mod scenario;

// Scripted driver for tests and examples
pub mod mock;

pub use aggregate::{
    group_stats, round3, summarize, GroupStats, ScenarioReport, ScenarioSummary, SuccessLabel,
    GROUP_STATS_HEADER,
};
pub use config::BenchConfig;
pub use error::{BenchError, Result};
pub use invoker::{BoxedCompletionDriver, CompletionDriver, Invoker, DEFAULT_MAX_TOKENS};
pub use outcome::{Completion, CompletionRequest, OutcomeRecord, Provider};
pub use runner::TrialRunner;
pub use scenario::{default_catalog, load_catalog, parse_catalog, Scenario};
