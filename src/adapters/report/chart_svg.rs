//! SVG trend charts.

use crate::domain::error::StagwatchError;
use crate::domain::pipeline::Snapshot;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDate;

const CHART_WIDTH: f64 = 720.0;
const CHART_HEIGHT: f64 = 300.0;
const MARGIN_LEFT: f64 = 50.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 40.0;

/// Draw `points` as a line chart with a title and min/mid/max labels.
/// Returns an empty string when there is nothing to plot.
pub fn trend_chart(title: &str, points: &[(NaiveDate, f64)]) -> String {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return String::new();
    };

    let min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    // Flat series still get a visible band.
    let range = (max - min).max(0.1);

    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let x_scale =
        |i: usize| -> f64 { MARGIN_LEFT + (i as f64 / (points.len() - 1).max(1) as f64) * plot_width };
    let y_scale = |v: f64| -> f64 { MARGIN_TOP + plot_height - ((v - min) / range) * plot_height };

    let polyline: Vec<String> = points
        .iter()
        .enumerate()
        .map(|(i, (_, v))| format!("{:.1},{:.1}", x_scale(i), y_scale(*v)))
        .collect();

    let mut svg = String::new();
    svg.push_str(&format!(
        r##"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"##,
        CHART_WIDTH, CHART_HEIGHT, CHART_WIDTH, CHART_HEIGHT
    ));
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"18\" font-size=\"13\" fill=\"#333\">{}</text>\n",
        MARGIN_LEFT,
        escape(title)
    ));
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        MARGIN_TOP,
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM
    ));
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM,
        CHART_WIDTH - MARGIN_RIGHT,
        CHART_HEIGHT - MARGIN_BOTTOM
    ));
    for (value, y) in [
        (max, MARGIN_TOP + 5.0),
        (min + range / 2.0, MARGIN_TOP + plot_height / 2.0),
        (min, CHART_HEIGHT - MARGIN_BOTTOM - 5.0),
    ] {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"end\" font-size=\"10\" fill=\"#666\">{:.2}%</text>\n",
            MARGIN_LEFT - 5.0,
            y,
            value
        ));
    }
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"start\" font-size=\"10\" fill=\"#666\">{}</text>\n",
        MARGIN_LEFT, CHART_HEIGHT - 15.0, first.0
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"end\" font-size=\"10\" fill=\"#666\">{}</text>\n",
        CHART_WIDTH - MARGIN_RIGHT,
        CHART_HEIGHT - 15.0,
        last.0
    ));
    svg.push_str(&format!(
        "  <polyline points=\"{}\" fill=\"none\" stroke=\"#dc2626\" stroke-width=\"2\"/>\n",
        polyline.join(" ")
    ));
    svg.push_str("</svg>\n");
    svg
}

pub fn yield_chart(points: &[(NaiveDate, f64)]) -> String {
    trend_chart("10-Year Treasury Yield (2y)", points)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Renders the 10-year yield trend of a snapshot.
///
/// Fails when the market group fell back: a chart of benchmark
/// constants would misrepresent the trend.
#[derive(Debug, Default)]
pub struct SvgTrendChart;

impl SvgTrendChart {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for SvgTrendChart {
    fn render(&self, snapshot: &Snapshot) -> Result<String, StagwatchError> {
        if snapshot.trends.ten_year_yield.is_empty() {
            return Err(StagwatchError::Report {
                reason: "no live 10-year yield data to chart".into(),
            });
        }
        Ok(yield_chart(&snapshot.trends.ten_year_yield))
    }
}
