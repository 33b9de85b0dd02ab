//! Trial runner
//!
//! Runs every scenario as `iterations` sequential batches of `concurrency`
//! invocations. A batch is awaited jointly on the current task: all calls
//! finish (or fail) before the next batch starts, and a failure never
//! cancels its siblings.

use futures::future::join_all;

use crate::config::BenchConfig;
use crate::invoker::Invoker;
use crate::outcome::OutcomeRecord;
use crate::scenario::Scenario;

/// Drives repeated invocations for one scenario at a time
#[derive(Debug)]
pub struct TrialRunner {
    invoker: Invoker,
    iterations: usize,
    concurrency: usize,
}

impl TrialRunner {
    pub fn new(config: &BenchConfig, invoker: Invoker) -> Self {
        Self {
            invoker,
            iterations: config.iterations,
            concurrency: config.concurrency,
        }
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// Run all iterations of a scenario
    ///
    /// Returns `iterations * concurrency` records, iteration order preserved.
    pub async fn run_scenario(&self, scenario: &Scenario) -> Vec<OutcomeRecord> {
        tracing::info!(scenario = %scenario.name, "Running scenario: {}", scenario.name);

        let mut records = Vec::new();
        for iteration in 0..self.iterations {
            tracing::info!("Iteration {}/{}", iteration + 1, self.iterations);
            records.extend(self.run_batch(scenario).await);
        }
        records
    }

    async fn run_batch(&self, scenario: &Scenario) -> Vec<OutcomeRecord> {
        let calls = (0..self.concurrency)
            .map(|_| self.invoker.invoke(&scenario.prompt, scenario.max_tokens));
        join_all(calls).await
    }
}
