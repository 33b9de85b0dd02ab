//! Latency box plots
//!
//! Box geometry follows the usual Tukey convention: linearly interpolated
//! quartiles, whiskers at the furthest samples within 1.5 IQR of the box,
//! everything beyond drawn as an outlier. Plots are laid out here in pixel
//! space and rendered to SVG through a minijinja template.

use minijinja::{context, AutoEscape, Environment};
use serde::Serialize;

use llmbench_core::error::{BenchError, Result};

const HEIGHT: f64 = 480.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 130.0;
const SLOT_WIDTH: f64 = 110.0;
const MIN_WIDTH: f64 = 800.0;
const Y_TICKS: usize = 5;

/// Five-number summary plus mean and outliers for one sample set
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub label: String,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub mean: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Compute box statistics; `None` when there are no samples
    pub fn from_samples(label: impl Into<String>, samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let low_fence = q1 - 1.5 * iqr;
        let high_fence = q3 + 1.5 * iqr;

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|v| *v >= low_fence)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= high_fence)
            .unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < low_fence || *v > high_fence)
            .collect();

        Some(Self {
            label: label.into(),
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
            outliers,
        })
    }

    fn lowest(&self) -> f64 {
        self.outliers
            .iter()
            .copied()
            .fold(self.whisker_low, f64::min)
    }

    fn highest(&self) -> f64 {
        self.outliers
            .iter()
            .copied()
            .fold(self.whisker_high, f64::max)
    }
}

// Linear interpolation between closest ranks
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Titles and options for one chart
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub show_means: bool,
    /// Rotate category labels for long scenario names
    pub rotate_labels: bool,
}

#[derive(Debug, Serialize)]
struct DrawnBox {
    label: String,
    center: f64,
    left: f64,
    width: f64,
    q1: f64,
    q3: f64,
    median: f64,
    whisker_low: f64,
    whisker_high: f64,
    cap_left: f64,
    cap_right: f64,
    mean: Option<f64>,
    outliers: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct Tick {
    y: f64,
    label: String,
}

/// Lay out and render a box plot as an SVG document
pub fn render_box_plot(spec: &ChartSpec, boxes: &[BoxStats]) -> Result<String> {
    let width = (boxes.len() as f64 * SLOT_WIDTH + MARGIN_LEFT + MARGIN_RIGHT).max(MIN_WIDTH);
    let plot_width = width - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_bottom = HEIGHT - MARGIN_BOTTOM;
    let plot_height = plot_bottom - MARGIN_TOP;

    let (y_min, y_max) = value_range(boxes);
    let to_y = |v: f64| plot_bottom - (v - y_min) / (y_max - y_min) * plot_height;

    let slot = if boxes.is_empty() {
        plot_width
    } else {
        plot_width / boxes.len() as f64
    };
    let box_width = (slot * 0.5).min(60.0);

    let drawn: Vec<DrawnBox> = boxes
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let center = MARGIN_LEFT + slot * (i as f64 + 0.5);
            DrawnBox {
                label: b.label.clone(),
                center,
                left: center - box_width / 2.0,
                width: box_width,
                q1: to_y(b.q1),
                q3: to_y(b.q3),
                median: to_y(b.median),
                whisker_low: to_y(b.whisker_low),
                whisker_high: to_y(b.whisker_high),
                cap_left: center - box_width / 4.0,
                cap_right: center + box_width / 4.0,
                mean: spec.show_means.then(|| to_y(b.mean)),
                outliers: b.outliers.iter().map(|v| to_y(*v)).collect(),
            }
        })
        .collect();

    let ticks: Vec<Tick> = (0..=Y_TICKS)
        .map(|i| {
            let value = y_min + (y_max - y_min) * i as f64 / Y_TICKS as f64;
            Tick {
                y: to_y(value),
                label: format!("{:.2}", value),
            }
        })
        .collect();

    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.add_template("boxplot.svg", BOX_PLOT_TEMPLATE)
        .map_err(|e| BenchError::report(format!("invalid chart template: {}", e)))?;
    let template = env
        .get_template("boxplot.svg")
        .map_err(|e| BenchError::report(e.to_string()))?;

    template
        .render(context! {
            width => width,
            height => HEIGHT,
            plot_left => MARGIN_LEFT,
            plot_right => width - MARGIN_RIGHT,
            plot_top => MARGIN_TOP,
            plot_bottom => plot_bottom,
            title => spec.title,
            x_label => spec.x_label,
            y_label => spec.y_label,
            rotate_labels => spec.rotate_labels,
            boxes => drawn,
            ticks => ticks,
        })
        .map_err(|e| BenchError::report(format!("failed to render chart: {}", e)))
}

// Padded value range covering every box, never degenerate
fn value_range(boxes: &[BoxStats]) -> (f64, f64) {
    let lo = boxes
        .iter()
        .map(BoxStats::lowest)
        .fold(f64::INFINITY, f64::min);
    let hi = boxes
        .iter()
        .map(BoxStats::highest)
        .fold(f64::NEG_INFINITY, f64::max);

    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }

    let span = hi - lo;
    let pad = if span > 0.0 { span * 0.05 } else { 0.5 };
    ((lo - pad).max(0.0), hi + pad)
}

const BOX_PLOT_TEMPLATE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{{ width }}" height="{{ height }}" viewBox="0 0 {{ width }} {{ height }}" font-family="sans-serif">
  <rect width="100%" height="100%" fill="#ffffff"/>
  <text x="{{ width / 2 }}" y="28" text-anchor="middle" font-size="16">{{ title }}</text>
  <rect x="{{ plot_left }}" y="{{ plot_top }}" width="{{ plot_right - plot_left }}" height="{{ plot_bottom - plot_top }}" fill="none" stroke="#333333"/>
  {%- for tick in ticks %}
  <line x1="{{ plot_left - 5 }}" y1="{{ tick.y }}" x2="{{ plot_left }}" y2="{{ tick.y }}" stroke="#333333"/>
  <line x1="{{ plot_left }}" y1="{{ tick.y }}" x2="{{ plot_right }}" y2="{{ tick.y }}" stroke="#e0e0e0"/>
  <text x="{{ plot_left - 8 }}" y="{{ tick.y + 4 }}" text-anchor="end" font-size="11">{{ tick.label }}</text>
  {%- endfor %}
  <text transform="translate(20 {{ (plot_top + plot_bottom) / 2 }}) rotate(-90)" text-anchor="middle" font-size="13">{{ y_label }}</text>
  <text x="{{ (plot_left + plot_right) / 2 }}" y="{{ height - 12 }}" text-anchor="middle" font-size="13">{{ x_label }}</text>
  {%- for box in boxes %}
  <g class="box">
    <line x1="{{ box.center }}" y1="{{ box.whisker_high }}" x2="{{ box.center }}" y2="{{ box.q3 }}" stroke="#1f77b4"/>
    <line x1="{{ box.center }}" y1="{{ box.q1 }}" x2="{{ box.center }}" y2="{{ box.whisker_low }}" stroke="#1f77b4"/>
    <line x1="{{ box.cap_left }}" y1="{{ box.whisker_high }}" x2="{{ box.cap_right }}" y2="{{ box.whisker_high }}" stroke="#1f77b4"/>
    <line x1="{{ box.cap_left }}" y1="{{ box.whisker_low }}" x2="{{ box.cap_right }}" y2="{{ box.whisker_low }}" stroke="#1f77b4"/>
    <rect x="{{ box.left }}" y="{{ box.q3 }}" width="{{ box.width }}" height="{{ box.q1 - box.q3 }}" fill="#dbe9f6" stroke="#1f77b4"/>
    <line x1="{{ box.left }}" y1="{{ box.median }}" x2="{{ box.left + box.width }}" y2="{{ box.median }}" stroke="#ff7f0e" stroke-width="2"/>
    {%- if box.mean is not none %}
    <path d="M {{ box.center }} {{ box.mean - 5 }} L {{ box.center + 5 }} {{ box.mean + 4 }} L {{ box.center - 5 }} {{ box.mean + 4 }} Z" fill="#2ca02c"/>
    {%- endif %}
    {%- for y in box.outliers %}
    <circle cx="{{ box.center }}" cy="{{ y }}" r="3" fill="none" stroke="#333333"/>
    {%- endfor %}
    {%- if rotate_labels %}
    <text transform="translate({{ box.center }} {{ plot_bottom + 14 }}) rotate(-45)" text-anchor="end" font-size="11">{{ box.label }}</text>
    {%- else %}
    <text x="{{ box.center }}" y="{{ plot_bottom + 18 }}" text-anchor="middle" font-size="12">{{ box.label }}</text>
    {%- endif %}
  </g>
  {%- endfor %}
</svg>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ChartSpec {
        ChartSpec {
            title: "Response Time Distribution - t".to_string(),
            x_label: "provider".to_string(),
            y_label: "Latency (seconds)".to_string(),
            show_means: false,
            rotate_labels: false,
        }
    }

    #[test]
    fn test_box_stats_quartiles() {
        let stats = BoxStats::from_samples("a", &[4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();

        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.whisker_low, 1.0);
        assert_eq!(stats.whisker_high, 5.0);
        assert_eq!(stats.mean, 3.0);
        assert!(stats.outliers.is_empty());
    }

    #[test]
    fn test_box_stats_interpolates() {
        let stats = BoxStats::from_samples("a", &[1.0, 3.0]).unwrap();
        assert_eq!(stats.q1, 1.5);
        assert_eq!(stats.median, 2.0);
        assert_eq!(stats.q3, 2.5);
    }

    #[test]
    fn test_box_stats_outliers() {
        let stats = BoxStats::from_samples("a", &[1.0, 1.1, 1.2, 1.3, 1.4, 9.0]).unwrap();

        assert_eq!(stats.outliers, vec![9.0]);
        assert_eq!(stats.whisker_high, 1.4);
        assert_eq!(stats.whisker_low, 1.0);
    }

    #[test]
    fn test_box_stats_single_sample() {
        let stats = BoxStats::from_samples("a", &[2.5]).unwrap();
        assert_eq!(stats.q1, 2.5);
        assert_eq!(stats.q3, 2.5);
        assert_eq!(stats.whisker_low, 2.5);
        assert_eq!(stats.whisker_high, 2.5);
    }

    #[test]
    fn test_box_stats_empty() {
        assert!(BoxStats::from_samples("a", &[]).is_none());
    }

    #[test]
    fn test_value_range_pads_degenerate_span() {
        let stats = BoxStats::from_samples("a", &[2.0]).unwrap();
        assert_eq!(value_range(&[stats]), (1.5, 2.5));
        assert_eq!(value_range(&[]), (0.0, 1.0));
    }

    #[test]
    fn test_render_contains_titles_and_boxes() {
        let boxes = vec![
            BoxStats::from_samples("Anthropic", &[1.0, 2.0, 3.0]).unwrap(),
            BoxStats::from_samples("Bedrock", &[2.0, 4.0]).unwrap(),
        ];
        let svg = render_box_plot(&spec(), &boxes).unwrap();

        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("Response Time Distribution - t"));
        assert!(svg.contains("Latency (seconds)"));
        assert!(svg.contains(">Anthropic</text>"));
        assert!(svg.contains(">Bedrock</text>"));
        assert_eq!(svg.matches("<g class=\"box\">").count(), 2);
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn test_render_means_and_escaping() {
        let mut spec = spec();
        spec.show_means = true;
        spec.rotate_labels = true;
        let boxes = vec![BoxStats::from_samples("a<b", &[1.0, 2.0]).unwrap()];

        let svg = render_box_plot(&spec, &boxes).unwrap();

        assert!(svg.contains("<path"));
        assert!(svg.contains("rotate(-45)"));
        assert!(svg.contains("a&lt;b"));
        assert!(!svg.contains(">a<b<"));
    }

    #[test]
    fn test_wide_chart_for_many_boxes() {
        let boxes: Vec<BoxStats> = (0..12)
            .map(|i| BoxStats::from_samples(format!("s{}", i), &[1.0]).unwrap())
            .collect();
        let svg = render_box_plot(&spec(), &boxes).unwrap();

        // 12 slots of 110px plus margins
        assert!(svg.contains("width=\"1430"));
    }
}
