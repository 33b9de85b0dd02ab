// Summary table CSV rendering

use llmbench_core::ScenarioSummary;

/// Fixed column order of the summary table
pub const SUMMARY_COLUMNS: [&str; 10] = [
    "test_name",
    "model",
    "input_tokens",
    "output_tokens",
    "latency",
    "success",
    "min_duration",
    "max_duration",
    "average_duration",
    "num_runs",
];

/// Render the summary table: header plus one row per summary, in order
pub fn render_summary_csv(rows: &[ScenarioSummary]) -> String {
    let mut out = SUMMARY_COLUMNS.join(",");
    out.push('\n');

    for row in rows {
        let fields = [
            csv_escape(&row.test_name),
            csv_escape(&row.model),
            optional(row.input_tokens),
            optional(row.output_tokens),
            format_float(row.latency),
            row.success.as_str().to_string(),
            format_float(row.min_duration),
            format_float(row.max_duration),
            format_float(row.average_duration),
            row.num_runs.to_string(),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out
}

/// Wrap a field value in quotes and escape any embedded quotes
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// Missing token counts are empty cells
fn optional(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Float with at least one decimal: `1.0`, `2.345`
pub(crate) fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
