//! Plain-text dashboard.
//!
//! Layout, top to bottom:
//! - Title with as-of date and the red-count headline
//! - One advisory line per fallback notice
//! - Signal status table
//! - Metric block with provenance
//! - Supplementary trend metrics
//! - Playbook line when the action threshold is met

use crate::domain::error::StagwatchError;
use crate::domain::pipeline::{Snapshot, Supplementary};
use crate::domain::playbook::{Advice, PLAYBOOK};
use crate::domain::reading::{Provenance, ReadingName, ReadingSet};
use crate::domain::signal::{VerdictSet, CPI_HIGH};
use crate::ports::report_port::ReportPort;

const NAME_WIDTH: usize = 34;
const LABEL_WIDTH: usize = 22;

/// Display order of the metric block: the headline gauges first.
const METRIC_ORDER: [ReadingName; 7] = [
    ReadingName::TenYearYield,
    ReadingName::CoreCpiYoy,
    ReadingName::UnemploymentRate,
    ReadingName::RealGdpQoqSaar,
    ReadingName::FedFunds,
    ReadingName::EquityYtd,
    ReadingName::CommodityChange,
];

#[derive(Debug, Default)]
pub struct TextReport;

impl TextReport {
    pub fn new() -> Self {
        Self
    }
}

fn render_signals(verdicts: &VerdictSet) -> String {
    let mut out = String::from("Signals\n");
    for v in &verdicts.verdicts {
        out.push_str(&format!(
            "  {}. {:<width$} {}\n",
            v.rule_id,
            v.name,
            v.tier,
            width = NAME_WIDTH
        ));
    }
    out
}

fn render_metrics(readings: &ReadingSet) -> String {
    let mut out = String::from("Metrics\n");
    for name in METRIC_ORDER {
        let reading = readings.get(name);
        let source = match reading.provenance {
            Provenance::Live => "live",
            Provenance::Fallback => "benchmark",
        };
        out.push_str(&format!(
            "  {:<width$} {:>8}  {}\n",
            name.label(),
            format!("{:.2}", reading.value),
            source,
            width = LABEL_WIDTH
        ));
    }
    out
}

fn render_supplementary(supplementary: &Supplementary) -> String {
    let yield_change = supplementary
        .yield_change_18m
        .map(|p| format!("{:+.2}%", p.value()))
        .unwrap_or_else(|| "n/a".to_string());
    let sustained = match supplementary.cpi_sustained_above_high {
        Some(true) => "yes",
        Some(false) => "no",
        None => "n/a",
    };
    format!(
        "Trend\n  {:<width$} {:>8}\n  {:<width$} {:>8}\n",
        "10yr change (18m)",
        yield_change,
        format!("Core CPI >{:.1} for 12m", CPI_HIGH),
        sustained,
        width = LABEL_WIDTH
    )
}

impl ReportPort for TextReport {
    fn render(&self, snapshot: &Snapshot) -> Result<String, StagwatchError> {
        let mut out = format!(
            "Stagflation Monitor ({})\n{}\n",
            snapshot.as_of.format("%Y-%m-%d"),
            snapshot.headline()
        );

        if !snapshot.notices.is_empty() {
            out.push('\n');
            for notice in &snapshot.notices {
                out.push_str(&format!("! {}\n", notice));
            }
        }

        out.push('\n');
        out.push_str(&render_signals(&snapshot.verdicts));
        out.push('\n');
        out.push_str(&render_metrics(&snapshot.readings));
        out.push('\n');
        out.push_str(&render_supplementary(&snapshot.supplementary));

        if snapshot.advice == Advice::Rotate {
            out.push_str(&format!("\nAction: {}\n", PLAYBOOK));
        }

        Ok(out)
    }
}
