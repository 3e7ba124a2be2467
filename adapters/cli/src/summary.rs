use std::fmt::Write as _;

use anyhow::{Context, Result};
use logmix_core::{RangePartition, Severity, RANGE_CAPACITY};
use logmix_generator::GenerationReport;
use serde::Serialize;

use crate::OutputFormat;

#[derive(Serialize)]
struct SummaryDocument<'a> {
    seed: u64,
    #[serde(flatten)]
    report: &'a GenerationReport,
}

/// Renders the per-level outcome of a run.
pub(crate) fn render_report(
    report: &GenerationReport,
    seed: u64,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string(&SummaryDocument { seed, report })
            .context("failed to serialize run summary"),
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(out, "seed: {seed}");
            let _ = writeln!(out, "{:<6} {:>6} {:>8} {:>7}", "level", "width", "count", "share");
            for severity in Severity::ALL {
                let _ = writeln!(
                    out,
                    "{:<6} {:>6} {:>8} {:>6.1}%",
                    severity.name(),
                    report.ranges().width(severity),
                    report.counts().get(severity).unwrap_or(0),
                    report.share(severity) * 100.0,
                );
            }
            let _ = write!(out, "total  {:>6} {:>8}", report.ranges().total(), report.counts().total());
            Ok(out)
        }
    }
}

/// Renders a derived partition without sampling it.
pub(crate) fn render_ranges(ranges: &RangePartition, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string(ranges).context("failed to serialize range partition")
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for (severity, width) in ranges.iter() {
                let percent = width as f64 * 100.0 / RANGE_CAPACITY as f64;
                let _ = writeln!(out, "{:<6} {:>6} {:>6.2}%", severity.name(), width, percent);
            }
            let _ = write!(out, "total  {:>6}", ranges.total());
            Ok(out)
        }
    }
}
