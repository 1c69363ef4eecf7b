//! Newline-delimited JSON events for machine consumers.

use super::{ExperimentInfo, ExperimentSummary, Reporter, TrialReport, TrialStage};
use crate::config::TargetBitrate;
use crate::trial::SkipReason;

use serde_json::json;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Writes one JSON object per event.
pub struct JsonReporter {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonReporter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    fn timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn write_value(&self, value: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", value);
            let _ = writer.flush();
        }
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for JsonReporter {
    fn experiment_started(&self, info: &ExperimentInfo) {
        self.write_value(json!({
            "type": "experiment_started",
            "source_video": info.source_video.display().to_string(),
            "bitrates": info.bitrates,
            "work_dir": info.work_dir.display().to_string(),
            "keep_recoded": info.keep_recoded,
            "timestamp": Self::timestamp(),
        }));
    }

    fn trial_started(&self, bitrate: &TargetBitrate, index: usize, total: usize) {
        self.write_value(json!({
            "type": "trial_started",
            "bitrate": bitrate,
            "index": index,
            "total": total,
            "timestamp": Self::timestamp(),
        }));
    }

    fn trial_stage(&self, bitrate: &TargetBitrate, stage: TrialStage) {
        self.write_value(json!({
            "type": "trial_stage",
            "bitrate": bitrate,
            "stage": stage,
            "timestamp": Self::timestamp(),
        }));
    }

    fn trial_complete(&self, report: &TrialReport) {
        self.write_value(json!({
            "type": "trial_complete",
            "report": report,
            "timestamp": Self::timestamp(),
        }));
    }

    fn trial_skipped(&self, bitrate: &TargetBitrate, reason: &SkipReason) {
        self.write_value(json!({
            "type": "trial_skipped",
            "bitrate": bitrate,
            "reason": reason,
            "message": reason.to_string(),
            "timestamp": Self::timestamp(),
        }));
    }

    fn experiment_complete(&self, summary: &ExperimentSummary) {
        self.write_value(json!({
            "type": "experiment_complete",
            "completed": summary.reports.len(),
            "skipped": summary.skipped.len(),
            "elapsed_seconds": summary.elapsed.as_secs_f64(),
            "timestamp": Self::timestamp(),
        }));
    }
}
