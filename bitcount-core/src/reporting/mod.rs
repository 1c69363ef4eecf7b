//! Reporting of experiment progress and per-bitrate results.
//!
//! The pipeline talks to a [`Reporter`] and never prints anything itself.
//! Every hook has a no-op default so implementations override only what
//! they render.

mod json;
mod table;

pub use json::JsonReporter;
pub use table::{TableReporter, TsvReporter, column_headers, row_values};

use crate::config::TargetBitrate;
use crate::parsing::FrameType;
use crate::stats::{CuAverages, CuSize};
use crate::trial::{SkipReason, TrialResult};

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Stages a trial moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialStage {
    FirstPass,
    SecondPass,
    Extract,
    Decode,
    Cleanup,
}

impl fmt::Display for TrialStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrialStage::FirstPass => "encoding (pass 1)",
            TrialStage::SecondPass => "encoding (pass 2)",
            TrialStage::Extract => "extracting bitstream",
            TrialStage::Decode => "counting bits",
            TrialStage::Cleanup => "cleaning up",
        };
        f.write_str(label)
    }
}

/// Announced once before the first trial.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentInfo {
    pub source_video: PathBuf,
    pub bitrates: Vec<TargetBitrate>,
    pub work_dir: PathBuf,
    pub keep_recoded: bool,
}

/// Everything an experiment produced, in configured bitrate order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExperimentSummary {
    pub reports: Vec<TrialReport>,
    pub skipped: Vec<SkippedTrial>,
    #[serde(skip)]
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedTrial {
    pub bitrate: TargetBitrate,
    pub reason: SkipReason,
}

impl ExperimentSummary {
    pub fn total_trials(&self) -> usize {
        self.reports.len() + self.skipped.len()
    }
}

/// One report row: rates normalized by the playback duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialReport {
    pub bitrate: TargetBitrate,
    /// Requested rate in kbit/s, for comparison with `achieved_kbps`.
    pub target_kbps: f64,
    pub duration_secs: f64,
    /// Extracted bitstream size over playback duration.
    pub achieved_kbps: f64,
    pub prediction_kbps: f64,
    pub residual_kbps: f64,
    pub other_kbps: f64,
    pub psnr: Option<f64>,
    pub avg_qp: f64,
    pub frames: u64,
    pub i_frames: Option<u64>,
    pub p_frames: Option<u64>,
    pub b_frames: Option<u64>,
    /// Coding-unit counts divided by the frame count.
    pub cu_per_frame: BTreeMap<CuSize, CuAverages>,
}

impl From<&TrialResult> for TrialReport {
    fn from(result: &TrialResult) -> Self {
        let encoder = &result.encoder;
        let seconds = encoder.duration_secs();
        let buckets = &result.accounting.buckets;
        let frame_count = |kind| encoder.frame_type(kind).map(|stats| stats.count);

        TrialReport {
            bitrate: result.bitrate.clone(),
            target_kbps: result.bitrate.kbps(),
            duration_secs: seconds,
            achieved_kbps: kbps(result.bitstream_bytes as f64 * 8.0, seconds),
            prediction_kbps: kbps(buckets.prediction as f64, seconds),
            residual_kbps: kbps(buckets.residual as f64, seconds),
            other_kbps: kbps(buckets.other as f64, seconds),
            psnr: encoder.global_psnr,
            avg_qp: encoder.avg_qp,
            frames: encoder.frames,
            i_frames: frame_count(FrameType::I),
            p_frames: frame_count(FrameType::P),
            b_frames: frame_count(FrameType::B),
            cu_per_frame: CuSize::ALL
                .iter()
                .map(|size| {
                    let counts = result.accounting.cu_counts(*size);
                    (*size, counts.per_frame(encoder.frames))
                })
                .collect(),
        }
    }
}

fn kbps(bits: f64, seconds: f64) -> f64 {
    if seconds > 0.0 {
        bits / seconds / 1000.0
    } else {
        0.0
    }
}

/// Receives experiment events.
pub trait Reporter: Send + Sync {
    fn experiment_started(&self, _info: &ExperimentInfo) {}
    fn trial_started(&self, _bitrate: &TargetBitrate, _index: usize, _total: usize) {}
    fn trial_stage(&self, _bitrate: &TargetBitrate, _stage: TrialStage) {}
    fn trial_complete(&self, _report: &TrialReport) {}
    fn trial_skipped(&self, _bitrate: &TargetBitrate, _reason: &SkipReason) {}
    fn experiment_complete(&self, _summary: &ExperimentSummary) {}
}

/// No-op reporter that discards all updates.
pub struct NullReporter;

impl Reporter for NullReporter {}
