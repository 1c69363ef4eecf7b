// ============================================================================
// bitcount-core/src/pipeline.rs
// ============================================================================
//
// EXPERIMENT PIPELINE: Sequential Per-Bitrate Trials
//
// This module drives the experiment. For every configured bitrate, in order,
// one trial runs to completion before the next starts, because all trials
// share the same intermediate file names in the working directory.
//
// WORKFLOW (per trial):
// 1. First encode pass, output discarded
// 2. Second encode pass, stderr parsed for frames, QP and PSNR
// 3. Stream-copy extraction of the Annex-B bitstream
// 4. Bit-count decoder, stdout folded into a BitAccounting
// 5. Cleanup of every intermediate (also on early exit, via a guard)
//
// A trial whose encoder output is incomplete, whose encode is empty, or
// whose bitstream never appeared is skipped; the experiment continues.
// Failing to launch a tool aborts the whole run.
//
// AI-ASSISTANT-INFO: Trial and experiment orchestration

// ---- Internal crate imports ----
use crate::cleanup::TrialCleanup;
use crate::config::{HarnessConfig, TargetBitrate};
use crate::error::{CoreError, CoreResult};
use crate::external::{
    Capture, EncodePass, EncodeParams, ProcessRunner, build_decoder_command, build_encode_command,
    build_extract_command,
};
use crate::parsing::EncoderStats;
use crate::reporting::{
    ExperimentInfo, ExperimentSummary, Reporter, SkippedTrial, TrialReport, TrialStage,
};
use crate::stats::BitAccounting;
use crate::trial::{SkipReason, TrialOutcome, TrialResult};

// ---- External crate imports ----
use log::{debug, info, warn};

// ---- Standard library imports ----
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

// ============================================================================
// EXPERIMENT
// ============================================================================

/// Runs one trial per configured bitrate and reports each as it finishes.
///
/// # Errors
///
/// Returns an error when the configuration is invalid, the source video
/// cannot be found, a tool cannot be launched, or an I/O error occurs
/// outside cleanup. Skipped trials are not errors.
pub fn run_experiment<R>(
    config: &HarnessConfig,
    runner: &R,
    reporter: &dyn Reporter,
) -> CoreResult<ExperimentSummary>
where
    R: ProcessRunner + ?Sized,
{
    config.validate()?;
    let source = resolve_source(&config.source_video)?;

    let mut resolved = config.clone();
    resolved.tools.ffmpeg = resolve_tool(&config.tools.ffmpeg)?;
    resolved.tools.decoder = resolve_tool(&config.tools.decoder)?;
    let config = &resolved;

    fs::create_dir_all(&config.work_dir)?;

    info!(
        "Measuring {} at {} bitrate(s) in {}",
        source.display(),
        config.bitrates.len(),
        config.work_dir.display()
    );
    reporter.experiment_started(&ExperimentInfo {
        source_video: source.clone(),
        bitrates: config.bitrates.clone(),
        work_dir: config.work_dir.clone(),
        keep_recoded: config.keep_recoded,
    });

    let started = Instant::now();
    let total = config.bitrates.len();
    let mut summary = ExperimentSummary::default();

    for (index, bitrate) in config.bitrates.iter().enumerate() {
        reporter.trial_started(bitrate, index, total);

        match run_trial(config, runner, reporter, &source, bitrate)? {
            TrialOutcome::Completed(result) => {
                let report = TrialReport::from(&result);
                info!(
                    "{}: {:.2} kbit/s achieved, prediction {:.2}, residual {:.2}, other {:.2}",
                    bitrate,
                    report.achieved_kbps,
                    report.prediction_kbps,
                    report.residual_kbps,
                    report.other_kbps
                );
                reporter.trial_complete(&report);
                summary.reports.push(report);
            }
            TrialOutcome::Skipped { bitrate, reason } => {
                warn!("Skipping {}: {}", bitrate, reason);
                reporter.trial_skipped(&bitrate, &reason);
                summary.skipped.push(SkippedTrial { bitrate, reason });
            }
        }
    }

    summary.elapsed = started.elapsed();
    info!(
        "Experiment finished: {} completed, {} skipped",
        summary.reports.len(),
        summary.skipped.len()
    );
    reporter.experiment_complete(&summary);
    Ok(summary)
}

/// Absolute path of the source video. Tools run inside the working
/// directory, so a relative path would resolve against the wrong place.
pub fn resolve_source(path: &Path) -> CoreResult<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| {
        CoreError::PathError(format!("Invalid input path '{}': {}", path.display(), e))
    })?;
    if !absolute.is_file() {
        return Err(CoreError::PathError(format!(
            "Invalid input path '{}': not a file",
            path.display()
        )));
    }
    Ok(absolute)
}

/// Tool path as the tools will see it from inside the working directory.
/// Bare program names are left alone for the `PATH` lookup; anything with a
/// directory part is made absolute against the current directory.
pub fn resolve_tool(path: &Path) -> CoreResult<PathBuf> {
    if path.is_absolute() || path.components().count() <= 1 {
        return Ok(path.to_path_buf());
    }
    std::path::absolute(path).map_err(|e| {
        CoreError::PathError(format!("Invalid tool path '{}': {}", path.display(), e))
    })
}

// ============================================================================
// TRIAL
// ============================================================================

/// Runs the four stages for one bitrate and cleans up afterwards.
///
/// `source` and any tool path with a directory part must already be
/// absolute, as [`run_experiment`] arranges. Intermediates are removed whether the
/// trial completes, is skipped, or fails.
pub fn run_trial<R>(
    config: &HarnessConfig,
    runner: &R,
    reporter: &dyn Reporter,
    source: &Path,
    bitrate: &TargetBitrate,
) -> CoreResult<TrialOutcome>
where
    R: ProcessRunner + ?Sized,
{
    let mut cleanup = TrialCleanup::for_trial(config, bitrate);

    let measured = measure(config, runner, reporter, source, bitrate)?;

    reporter.trial_stage(bitrate, TrialStage::Cleanup);
    let report = cleanup.run();
    if !report.is_clean() {
        warn!(
            "{} intermediate file(s) could not be cleaned up after {}",
            report.failures.len(),
            bitrate
        );
    }

    Ok(match measured {
        Ok(result) => TrialOutcome::Completed(result),
        Err(reason) => TrialOutcome::Skipped {
            bitrate: bitrate.clone(),
            reason,
        },
    })
}

fn measure<R>(
    config: &HarnessConfig,
    runner: &R,
    reporter: &dyn Reporter,
    source: &Path,
    bitrate: &TargetBitrate,
) -> CoreResult<Result<TrialResult, SkipReason>>
where
    R: ProcessRunner + ?Sized,
{
    let params = |pass| EncodeParams {
        source: source.to_path_buf(),
        bitrate: bitrate.clone(),
        pass,
    };

    reporter.trial_stage(bitrate, TrialStage::FirstPass);
    runner.run(
        &build_encode_command(config, &params(EncodePass::First)),
        Capture::Nothing,
    )?;

    reporter.trial_stage(bitrate, TrialStage::SecondPass);
    let encode_log = runner.run(
        &build_encode_command(config, &params(EncodePass::Second)),
        Capture::Stderr,
    )?;

    let encoder = match EncoderStats::parse(&encode_log.text) {
        Ok(stats) => stats,
        Err(e) => return Ok(Err(e.into())),
    };
    if encoder.frames == 0 {
        return Ok(Err(SkipReason::EmptyEncode));
    }
    debug!(
        "{}: {} frames at {} fps, Avg QP {:.2}",
        bitrate, encoder.frames, encoder.frame_rate, encoder.avg_qp
    );

    reporter.trial_stage(bitrate, TrialStage::Extract);
    runner.run(&build_extract_command(config), Capture::Nothing)?;

    let bitstream = config.work_dir.join(&config.artifacts.bitstream);
    let bitstream_bytes = match fs::metadata(&bitstream) {
        Ok(meta) if meta.is_file() => meta.len(),
        Ok(_) => return Ok(Err(SkipReason::MissingBitstream)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(Err(SkipReason::MissingBitstream));
        }
        Err(e) => return Err(e.into()),
    };

    reporter.trial_stage(bitrate, TrialStage::Decode);
    let decoded = runner.run(&build_decoder_command(config), Capture::Stdout)?;
    let accounting = BitAccounting::from_lines(&config.classification, decoded.lines());
    debug!(
        "{}: {} element line(s), {} excluded, {} CU line(s), {} ignored",
        bitrate,
        accounting.element_lines,
        accounting.excluded_lines,
        accounting.cu_lines,
        accounting.ignored_lines
    );

    Ok(Ok(TrialResult {
        bitrate: bitrate.clone(),
        encoder,
        bitstream_bytes,
        accounting,
    }))
}
