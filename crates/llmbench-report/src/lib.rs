// llmbench Reporter
//
// Writes the run's artifacts: one summary CSV per run and SVG box plots of
// latency per scenario and across all scenarios.

pub mod chart;
pub mod csv;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use llmbench_core::error::Result;
use llmbench_core::{OutcomeRecord, Provider, ScenarioSummary};

pub use chart::{render_box_plot, BoxStats, ChartSpec};
pub use csv::{render_summary_csv, SUMMARY_COLUMNS};

pub const COMBINED_CHART_FILE: &str = "all_scenarios_boxplot.svg";
const LATENCY_AXIS: &str = "Latency (seconds)";

/// Artifact writer for one run
#[derive(Debug, Clone)]
pub struct Reporter {
    output_dir: PathBuf,
    chart_dir: PathBuf,
    provider: Provider,
}

impl Reporter {
    /// Create the reporter, creating both directories if needed
    pub fn new(
        output_dir: impl Into<PathBuf>,
        chart_dir: impl Into<PathBuf>,
        provider: Provider,
    ) -> Result<Self> {
        let output_dir = output_dir.into();
        let chart_dir = chart_dir.into();
        fs::create_dir_all(&output_dir)?;
        fs::create_dir_all(&chart_dir)?;

        Ok(Self {
            output_dir,
            chart_dir,
            provider,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn chart_dir(&self) -> &Path {
        &self.chart_dir
    }

    /// Write the summary table to a timestamped CSV file
    ///
    /// Fails with `AlreadyExists` rather than replacing an earlier summary
    /// written within the same second.
    pub fn write_summary(&self, rows: &[ScenarioSummary]) -> Result<PathBuf> {
        self.write_summary_at(rows, Local::now())
    }

    pub(crate) fn write_summary_at(
        &self,
        rows: &[ScenarioSummary],
        timestamp: DateTime<Local>,
    ) -> Result<PathBuf> {
        let filename = format!(
            "summary_results_{}_{}.csv",
            self.provider.slug(),
            timestamp.format("%Y%m%d_%H%M%S")
        );
        let path = self.output_dir.join(filename);

        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        file.write_all(render_summary_csv(rows).as_bytes())?;
        tracing::info!(path = %path.display(), rows = rows.len(), "Summary written");

        Ok(path)
    }

    /// Box plot of one scenario's latencies, one box per provider
    pub fn render_scenario_chart(&self, name: &str, records: &[OutcomeRecord]) -> Result<PathBuf> {
        let boxes: Vec<BoxStats> = Provider::ALL
            .iter()
            .filter_map(|provider| {
                let samples: Vec<f64> = records
                    .iter()
                    .filter(|r| r.provider == *provider)
                    .map(|r| r.latency)
                    .collect();
                BoxStats::from_samples(provider.label(), &samples)
            })
            .collect();

        let spec = ChartSpec {
            title: format!("Response Time Distribution - {}", name),
            x_label: "Provider".to_string(),
            y_label: LATENCY_AXIS.to_string(),
            show_means: false,
            rotate_labels: false,
        };

        let path = self.chart_dir.join(format!("{}_boxplot.svg", name));
        fs::write(&path, render_box_plot(&spec, &boxes)?)?;
        tracing::debug!(path = %path.display(), "Scenario chart written");

        Ok(path)
    }

    /// Box plot across scenarios; scenarios without records are left out
    pub fn render_combined_chart(&self, scenarios: &[(String, Vec<OutcomeRecord>)]) -> Result<PathBuf> {
        let boxes: Vec<BoxStats> = scenarios
            .iter()
            .filter_map(|(name, records)| {
                let samples: Vec<f64> = records.iter().map(|r| r.latency).collect();
                BoxStats::from_samples(name.as_str(), &samples)
            })
            .collect();

        let spec = ChartSpec {
            title: "Latency Distribution for All Scenarios".to_string(),
            x_label: "Scenario".to_string(),
            y_label: LATENCY_AXIS.to_string(),
            show_means: true,
            rotate_labels: true,
        };

        let path = self.chart_dir.join(COMBINED_CHART_FILE);
        fs::write(&path, render_box_plot(&spec, &boxes)?)?;
        tracing::info!(path = %path.display(), scenarios = boxes.len(), "Combined chart written");

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use llmbench_core::{BenchError, Completion, SuccessLabel};

    fn ok(provider: Provider, latency: f64) -> OutcomeRecord {
        OutcomeRecord::success(provider, "m", latency, Completion::text("hi"))
    }

    fn summary(name: &str) -> ScenarioSummary {
        ScenarioSummary {
            test_name: name.to_string(),
            model: "m".to_string(),
            input_tokens: None,
            output_tokens: None,
            latency: 1.0,
            success: SuccessLabel::Success,
            min_duration: 1.0,
            max_duration: 1.0,
            average_duration: 1.0,
            num_runs: 1,
        }
    }

    #[test]
    fn test_new_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/results");
        let charts = dir.path().join("charts");

        let reporter = Reporter::new(&out, &charts, Provider::Anthropic).unwrap();

        assert!(out.is_dir());
        assert!(charts.is_dir());
        assert_eq!(reporter.output_dir(), out.as_path());
    }

    #[test]
    fn test_new_fails_when_path_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let result = Reporter::new(blocker.join("out"), dir.path().join("charts"), Provider::Anthropic);
        assert!(result.is_err());
    }

    #[test]
    fn test_write_summary_file_name_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = Reporter::new(dir.path().join("out"), dir.path().join("charts"), Provider::Bedrock).unwrap();

        let path = reporter
            .write_summary(&[summary("a"), summary("b")])
            .unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("summary_results_bedrock_"));
        assert!(name.ends_with(".csv"));
        // summary_results_bedrock_ + YYYYMMDD_HHMMSS + .csv
        assert_eq!(name.len(), "summary_results_bedrock_".len() + 15 + 4);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], SUMMARY_COLUMNS.join(","));
        assert!(lines[1].starts_with("a,m,,,1.0,success"));
        assert!(lines[2].starts_with("b,"));
    }

    #[test]
    fn test_write_summary_never_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = Reporter::new(dir.path().join("out"), dir.path().join("charts"), Provider::Anthropic).unwrap();
        let stamp = chrono::Local.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();

        let first = reporter.write_summary_at(&[summary("a")], stamp).unwrap();
        assert_eq!(
            first.file_name().unwrap(),
            "summary_results_anthropic_20250304_050607.csv"
        );
        let before = fs::read_to_string(&first).unwrap();

        let err = reporter.write_summary_at(&[summary("b")], stamp).unwrap_err();

        assert!(matches!(err, BenchError::Io(ref e) if e.kind() == std::io::ErrorKind::AlreadyExists));
        assert_eq!(fs::read_to_string(&first).unwrap(), before);
    }

    #[test]
    fn test_scenario_chart_one_box_per_provider() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = Reporter::new(dir.path().join("out"), dir.path().join("charts"), Provider::Anthropic).unwrap();
        let records = vec![
            ok(Provider::Anthropic, 1.0),
            ok(Provider::Anthropic, 2.0),
            OutcomeRecord::failure(Provider::Anthropic, "m", 0.5, "boom"),
        ];

        let path = reporter.render_scenario_chart("short_response", &records).unwrap();

        assert_eq!(path, dir.path().join("charts/short_response_boxplot.svg"));
        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Response Time Distribution - short_response"));
        assert!(svg.contains("Latency (seconds)"));
        assert_eq!(svg.matches("<g class=\"box\">").count(), 1);
        assert!(svg.contains(">Anthropic</text>"));
    }

    #[test]
    fn test_combined_chart_skips_empty_scenarios() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = Reporter::new(dir.path().join("out"), dir.path().join("charts"), Provider::Anthropic).unwrap();
        let scenarios = vec![
            ("first".to_string(), vec![ok(Provider::Anthropic, 1.0)]),
            ("empty".to_string(), vec![]),
            ("second".to_string(), vec![ok(Provider::Anthropic, 2.0), ok(Provider::Anthropic, 4.0)]),
        ];

        let path = reporter.render_combined_chart(&scenarios).unwrap();

        assert_eq!(path.file_name().unwrap(), COMBINED_CHART_FILE);
        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Latency Distribution for All Scenarios"));
        assert_eq!(svg.matches("<g class=\"box\">").count(), 2);
        assert!(svg.contains(">first</text>"));
        assert!(!svg.contains(">empty</text>"));
        assert!(svg.contains("<path"));
    }

    #[test]
    fn test_combined_chart_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = Reporter::new(dir.path().join("out"), dir.path().join("charts"), Provider::Anthropic).unwrap();

        reporter
            .render_combined_chart(&[("old".to_string(), vec![ok(Provider::Anthropic, 1.0)])])
            .unwrap();
        let path = reporter
            .render_combined_chart(&[("new".to_string(), vec![ok(Provider::Anthropic, 1.0)])])
            .unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains(">new</text>"));
        assert!(!svg.contains(">old</text>"));
    }
}
