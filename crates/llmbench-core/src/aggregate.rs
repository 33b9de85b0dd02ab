//! Aggregation of outcome records
//!
//! Reduces one scenario's records into per-provider statistics and a single
//! summary row. All figures are rounded to 3 decimals.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::outcome::{OutcomeRecord, Provider};

/// Round to 3 decimal places
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Latency statistics for one provider partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub provider: Provider,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; undefined for a single record
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
    /// Fraction of records with `success == true`
    pub success_rate: f64,
}

impl fmt::Display for GroupStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let std = self
            .std
            .map(|s| format!("{:.3}", s))
            .unwrap_or_else(|| "NaN".to_string());
        write!(
            f,
            "{:<10} {:>6} {:>9.3} {:>9} {:>9.3} {:>9.3} {:>8.3}",
            self.provider.label(),
            self.count,
            self.mean,
            std,
            self.min,
            self.max,
            self.success_rate
        )
    }
}

/// Header line matching `GroupStats`'s Display columns
pub const GROUP_STATS_HEADER: &str =
    "provider    count      mean       std       min       max  success";

/// Label written to the `success` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuccessLabel {
    Success,
    Failed,
}

impl SuccessLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuccessLabel::Success => "success",
            SuccessLabel::Failed => "failed",
        }
    }
}

impl fmt::Display for SuccessLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the run's summary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub test_name: String,
    pub model: String,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    /// Latency of the representative record
    pub latency: f64,
    pub success: SuccessLabel,
    pub min_duration: f64,
    pub max_duration: f64,
    pub average_duration: f64,
    pub num_runs: usize,
}

/// Everything the aggregator derives from one scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    pub groups: Vec<GroupStats>,
    pub summary: ScenarioSummary,
}

/// Partition by provider and compute latency statistics per partition
pub fn group_stats(records: &[OutcomeRecord]) -> Vec<GroupStats> {
    let mut partitions: BTreeMap<Provider, Vec<&OutcomeRecord>> = BTreeMap::new();
    for record in records {
        partitions.entry(record.provider).or_default().push(record);
    }

    partitions
        .into_iter()
        .map(|(provider, group)| {
            let latencies: Vec<f64> = group.iter().map(|r| r.latency).collect();
            let successes = group.iter().filter(|r| r.success).count();
            GroupStats {
                provider,
                count: group.len(),
                mean: round3(mean(&latencies)),
                std: sample_std(&latencies).map(round3),
                min: round3(latencies.iter().copied().fold(f64::INFINITY, f64::min)),
                max: round3(latencies.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
                success_rate: round3(successes as f64 / group.len() as f64),
            }
        })
        .collect()
}

/// Reduce a scenario's records to statistics and a summary row
///
/// Returns `None` for an empty record list; the scenario is then left out of
/// the summary table.
pub fn summarize(test_name: &str, records: &[OutcomeRecord]) -> Option<ScenarioReport> {
    let representative = records
        .iter()
        .find(|r| r.success)
        .or_else(|| records.first())?;

    let latencies: Vec<f64> = records.iter().map(|r| r.latency).collect();
    let min = latencies.iter().copied().fold(f64::INFINITY, f64::min);
    let max = latencies.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let summary = ScenarioSummary {
        test_name: test_name.to_string(),
        model: representative.model.clone(),
        input_tokens: representative.input_tokens,
        output_tokens: representative.output_tokens,
        latency: round3(representative.latency),
        success: if representative.success {
            SuccessLabel::Success
        } else {
            SuccessLabel::Failed
        },
        min_duration: round3(min),
        max_duration: round3(max),
        average_duration: round3(mean(&latencies)),
        num_runs: records.len(),
    };

    Some(ScenarioReport {
        groups: group_stats(records),
        summary,
    })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}
