// ============================================================================
// bitcount-core/src/reporting/table.rs
// ============================================================================
//
// TEXT REPORTERS: Fixed-Width Table and Tab-Separated Rows
//
// Both reporters print the same columns in the same order: a header line
// when the experiment starts, then one row per completed trial as soon as it
// finishes. The table reporter also keeps a spinner on stderr while a trial
// runs and prints skip notices there, so stdout carries only the table.
//
// AI-ASSISTANT-INFO: Table and TSV rendering of trial reports

// ---- Internal crate imports ----
use super::{ExperimentInfo, ExperimentSummary, Reporter, TrialReport, TrialStage};
use crate::config::TargetBitrate;
use crate::stats::CuSize;
use crate::trial::SkipReason;

// ---- External crate imports ----
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

// ---- Standard library imports ----
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

const MIN_COLUMN_WIDTH: usize = 9;

/// Column headers, in report order.
pub fn column_headers() -> Vec<String> {
    let mut headers: Vec<String> = [
        "bitrate",
        "target_kbps",
        "kbps",
        "pred_kbps",
        "resid_kbps",
        "other_kbps",
        "psnr",
        "qp",
        "frames",
        "i",
        "p",
        "b",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect();

    for size in CuSize::ALL {
        headers.push(format!("cu{size}"));
        for field in ["inter", "intra", "skip", "ipcm"] {
            headers.push(format!("cu{size}_{field}"));
        }
    }
    headers
}

/// Formatted cell values for one report, aligned with [`column_headers`].
/// Absent optional values render as empty cells.
pub fn row_values(report: &TrialReport) -> Vec<String> {
    let mut row = vec![
        report.bitrate.to_string(),
        format!("{:.2}", report.target_kbps),
        format!("{:.2}", report.achieved_kbps),
        format!("{:.2}", report.prediction_kbps),
        format!("{:.2}", report.residual_kbps),
        format!("{:.2}", report.other_kbps),
        report.psnr.map(|p| format!("{p:.3}")).unwrap_or_default(),
        format!("{:.2}", report.avg_qp),
        report.frames.to_string(),
        optional_count(report.i_frames),
        optional_count(report.p_frames),
        optional_count(report.b_frames),
    ];

    for size in CuSize::ALL {
        let avg = report.cu_per_frame.get(&size).copied().unwrap_or_default();
        for value in [avg.total, avg.inter, avg.intra, avg.skipped, avg.ipcm] {
            row.push(format!("{value:.2}"));
        }
    }
    row
}

fn optional_count(count: Option<u64>) -> String {
    count.map(|n| n.to_string()).unwrap_or_default()
}

fn widths(headers: &[String]) -> Vec<usize> {
    headers
        .iter()
        .map(|h| h.len().max(MIN_COLUMN_WIDTH))
        .collect()
}

fn render_fixed(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:>width$}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Human-friendly reporter printing a fixed-width table.
pub struct TableReporter {
    writer: Mutex<Box<dyn Write + Send>>,
    widths: Vec<usize>,
    spinner: Mutex<Option<ProgressBar>>,
    show_progress: bool,
}

impl TableReporter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()), true)
    }

    pub fn with_writer(writer: Box<dyn Write + Send>, show_progress: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            widths: widths(&column_headers()),
            spinner: Mutex::new(None),
            show_progress,
        }
    }

    fn write_line(&self, line: &str) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{line}");
            let _ = writer.flush();
        }
    }

    fn finish_spinner(&self) {
        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl Default for TableReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TableReporter {
    fn experiment_started(&self, info: &ExperimentInfo) {
        eprintln!(
            "{} {} at {} bitrate(s)",
            style("Measuring").bold().cyan(),
            info.source_video.display(),
            info.bitrates.len()
        );
        self.write_line(&render_fixed(&column_headers(), &self.widths));
    }

    fn trial_started(&self, bitrate: &TargetBitrate, index: usize, total: usize) {
        if !self.show_progress {
            return;
        }
        self.finish_spinner();
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {prefix:.bold} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_prefix(format!("[{}/{}] {}", index + 1, total, bitrate));
        pb.enable_steady_tick(Duration::from_millis(120));
        if let Ok(mut guard) = self.spinner.lock() {
            *guard = Some(pb);
        }
    }

    fn trial_stage(&self, _bitrate: &TargetBitrate, stage: TrialStage) {
        if let Ok(guard) = self.spinner.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_message(stage.to_string());
            }
        }
    }

    fn trial_complete(&self, report: &TrialReport) {
        self.finish_spinner();
        self.write_line(&render_fixed(&row_values(report), &self.widths));
    }

    fn trial_skipped(&self, bitrate: &TargetBitrate, reason: &SkipReason) {
        self.finish_spinner();
        eprintln!(
            "{} {}: {}",
            style("Skipped").yellow().bold(),
            bitrate,
            reason
        );
    }

    fn experiment_complete(&self, summary: &ExperimentSummary) {
        self.finish_spinner();
        let skipped = if summary.skipped.is_empty() {
            style("0 skipped".to_string()).dim()
        } else {
            style(format!("{} skipped", summary.skipped.len())).yellow()
        };
        eprintln!(
            "{} {} of {} trial(s) in {:.1}s, {}",
            style("Done").green().bold(),
            summary.reports.len(),
            summary.total_trials(),
            summary.elapsed.as_secs_f64(),
            skipped
        );
    }
}

/// Tab-separated header and rows, nothing else.
pub struct TsvReporter {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl TsvReporter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    fn write_cells(&self, cells: &[String]) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", cells.join("\t"));
            let _ = writer.flush();
        }
    }
}

impl Default for TsvReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TsvReporter {
    fn experiment_started(&self, _info: &ExperimentInfo) {
        self.write_cells(&column_headers());
    }

    fn trial_complete(&self, report: &TrialReport) {
        self.write_cells(&row_values(report));
    }
}
