// bitcount-core/tests/pipeline_tests.rs

use bitcount_core::config::{HarnessConfig, HarnessConfigBuilder};
use bitcount_core::error::{CoreError, command_start_error};
use bitcount_core::external::{Capture, CommandOutput, ProcessRunner, ToolCommand};
use bitcount_core::reporting::{
    ExperimentInfo, ExperimentSummary, NullReporter, Reporter, TrialReport, TrialStage,
};
use bitcount_core::{CoreResult, CuSize, SkipReason, TargetBitrate, run_experiment};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::{TempDir, tempdir};

const ARTIFACTS: [&str; 4] = [
    "recoded.mp4",
    "recoded.h265",
    "x265_2pass.log",
    "x265_2pass.log.cutree",
];

// 100 frames at 25 fps: four seconds of video.
const GOOD_ENCODE: &str = "\
  Stream #0:0(und): Video: h264 (High), yuv420p, 1280x720, 2500 kb/s, 25 fps, 25 tbr, 12800 tbn
x265 [info]: frame I:      1, Avg QP:25.00  kb/s: 4000.00
x265 [info]: frame P:     24, Avg QP:28.00  kb/s: 900.00
x265 [info]: frame B:     75, Avg QP:31.00  kb/s: 250.00
encoded 100 frames in 5.00s (20.00 fps), 480.00 kb/s, Avg QP:30.12, Global PSNR: 40.500
";

const BROKEN_ENCODE: &str = "\
  Stream #0:0(und): Video: h264 (High), yuv420p, 1280x720, 25 fps
[libx265 @ 0x55d0] Error initializing output stream 0:0
";

const EMPTY_ENCODE: &str = "\
  Stream #0:0(und): Video: h264 (High), yuv420p, 1280x720, 25 fps
encoded 0 frames, Avg QP:0.00
";

const DECODER_OUTPUT: &str = "\
HM software: Decoder Version [16.20]
 CABAC_BITS__SKIP_FLAG : 1 2 3 4 5 6 7 400000 ( 10)
 CABAC_BITS__GT1_FLAG : 1 2 3 4 5 6 7 1200000 ( 30)
 CABAC_BITS__SAO_OFFSET : 1 2 3 4 5 6 7 80000 ( 2)
 NAL_UNIT_TOTAL_BODY : 1 2 3 4 5 6 7 9999999 ( 99)
 SLICE_HEADER_BITS :  -  -  1  2  3  20000 ( 1)
 64 CUs: 200 50 100 40 10
 8 CUs: 1000 0 1000 0 0
 Total Time:        0.812 sec.
";

/// How the fake tools behave for one target bitrate.
#[derive(Clone)]
struct Script {
    encode_stderr: &'static str,
    bitstream_bytes: Option<usize>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            encode_stderr: GOOD_ENCODE,
            bitstream_bytes: Some(250_000),
        }
    }
}

/// Runner standing in for ffmpeg and the decoder. Writes the files the real
/// tools would leave in the working directory and returns canned output.
#[derive(Default)]
struct ScriptedRunner {
    scripts: HashMap<String, Script>,
    decoder_missing: bool,
    calls: RefCell<Vec<ToolCommand>>,
    current_bitrate: RefCell<Option<String>>,
}

impl ScriptedRunner {
    fn with_script(mut self, bitrate: &str, script: Script) -> Self {
        self.scripts.insert(bitrate.to_string(), script);
        self
    }

    fn script(&self) -> Script {
        self.current_bitrate
            .borrow()
            .as_ref()
            .and_then(|b| self.scripts.get(b).cloned())
            .unwrap_or_default()
    }

    fn calls(&self) -> Vec<ToolCommand> {
        self.calls.borrow().clone()
    }
}

fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, command: &ToolCommand, capture: Capture) -> CoreResult<CommandOutput> {
        self.calls.borrow_mut().push(command.clone());
        let dir = command.working_dir().unwrap_or(Path::new(".")).to_path_buf();
        let args = command.get_args();

        if command.tool_name() == "TAppDecoder" {
            if self.decoder_missing {
                return Err(command_start_error(
                    "TAppDecoder",
                    io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
                ));
            }
            assert_eq!(capture, Capture::Stdout);
            return Ok(CommandOutput {
                success: true,
                code: Some(0),
                text: DECODER_OUTPUT.to_string(),
            });
        }

        if let Some(bitrate) = value_after(args, "-b:v") {
            *self.current_bitrate.borrow_mut() = Some(bitrate.to_string());
        }
        let script = self.script();

        match value_after(args, "-x265-params") {
            Some("pass=1") => {
                assert_eq!(capture, Capture::Nothing);
                fs::write(dir.join("x265_2pass.log"), b"#options")?;
                fs::write(dir.join("x265_2pass.log.cutree"), b"cutree")?;
                Ok(CommandOutput::default())
            }
            Some("pass=2:psnr=1") => {
                assert_eq!(capture, Capture::Stderr);
                fs::write(dir.join("recoded.mp4"), b"mp4")?;
                Ok(CommandOutput {
                    success: true,
                    code: Some(0),
                    text: script.encode_stderr.to_string(),
                })
            }
            _ => {
                assert_eq!(value_after(args, "-bsf:v"), Some("hevc_mp4toannexb"));
                if let Some(bytes) = script.bitstream_bytes {
                    fs::write(dir.join("recoded.h265"), vec![0u8; bytes])?;
                }
                Ok(CommandOutput {
                    success: script.bitstream_bytes.is_some(),
                    code: Some(if script.bitstream_bytes.is_some() { 0 } else { 1 }),
                    text: String::new(),
                })
            }
        }
    }
}

#[derive(Default)]
struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn experiment_started(&self, info: &ExperimentInfo) {
        self.push(format!("start {}", info.bitrates.len()));
    }
    fn trial_started(&self, bitrate: &TargetBitrate, index: usize, _total: usize) {
        self.push(format!("trial {index} {bitrate}"));
    }
    fn trial_stage(&self, _bitrate: &TargetBitrate, _stage: TrialStage) {}
    fn trial_complete(&self, report: &TrialReport) {
        self.push(format!("complete {}", report.bitrate));
    }
    fn trial_skipped(&self, bitrate: &TargetBitrate, _reason: &SkipReason) {
        self.push(format!("skipped {bitrate}"));
    }
    fn experiment_complete(&self, summary: &ExperimentSummary) {
        self.push(format!("done {}", summary.total_trials()));
    }
}

struct Fixture {
    _root: TempDir,
    work_dir: PathBuf,
    source: PathBuf,
}

fn fixture() -> Fixture {
    let root = tempdir().unwrap();
    let source = root.path().join("clip.mp4");
    fs::write(&source, b"source").unwrap();
    let work_dir = root.path().join("work");
    Fixture {
        work_dir,
        source,
        _root: root,
    }
}

fn config(fx: &Fixture, bitrates: &[&str], keep: bool) -> HarnessConfig {
    HarnessConfigBuilder::new()
        .source_video(&fx.source)
        .work_dir(&fx.work_dir)
        .bitrate_list(bitrates)
        .unwrap()
        .keep_recoded(keep)
        .build()
}

fn assert_no_artifacts(dir: &Path) {
    for name in ARTIFACTS {
        assert!(!dir.join(name).exists(), "{name} was left behind");
    }
}

#[test]
fn completed_trials_report_rates_in_bitrate_order() {
    let fx = fixture();
    let runner = ScriptedRunner::default();
    let reporter = RecordingReporter::default();

    let summary = run_experiment(&config(&fx, &["1000k", "500k"], false), &runner, &reporter)
        .unwrap();

    assert_eq!(summary.reports.len(), 2);
    assert!(summary.skipped.is_empty());
    assert_eq!(summary.reports[0].bitrate.as_str(), "1000k");
    assert_eq!(summary.reports[1].bitrate.as_str(), "500k");

    let report = &summary.reports[0];
    assert_eq!(report.target_kbps, 1000.0);
    assert_eq!(report.duration_secs, 4.0);
    // 250 000 bytes over four seconds
    assert_eq!(report.achieved_kbps, 500.0);
    assert_eq!(report.prediction_kbps, 100.0);
    assert_eq!(report.residual_kbps, 300.0);
    // SAO offset plus slice header; the NAL body total is excluded
    assert_eq!(report.other_kbps, 25.0);
    assert_eq!(report.psnr, Some(40.5));
    assert_eq!(report.avg_qp, 30.12);
    assert_eq!(report.frames, 100);
    assert_eq!(report.i_frames, Some(1));
    assert_eq!(report.p_frames, Some(24));
    assert_eq!(report.b_frames, Some(75));
    assert_eq!(report.cu_per_frame[&CuSize::S64].total, 2.0);
    assert_eq!(report.cu_per_frame[&CuSize::S64].skipped, 0.4);
    assert_eq!(report.cu_per_frame[&CuSize::S8].intra, 10.0);
    assert_eq!(report.cu_per_frame[&CuSize::S16].total, 0.0);

    assert_eq!(
        reporter.events(),
        [
            "start 2",
            "trial 0 1000k",
            "complete 1000k",
            "trial 1 500k",
            "complete 500k",
            "done 2"
        ]
    );
    assert_no_artifacts(&fx.work_dir);
}

#[test]
fn tools_run_in_stage_order_inside_work_dir() {
    let fx = fixture();
    let runner = ScriptedRunner::default();

    run_experiment(&config(&fx, &["300k"], false), &runner, &NullReporter).unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(value_after(calls[0].get_args(), "-x265-params"), Some("pass=1"));
    assert_eq!(
        value_after(calls[1].get_args(), "-x265-params"),
        Some("pass=2:psnr=1")
    );
    assert_eq!(value_after(calls[2].get_args(), "-bsf:v"), Some("hevc_mp4toannexb"));
    assert_eq!(calls[3].get_args(), ["-b", "recoded.h265"]);
    for call in &calls {
        assert_eq!(call.working_dir(), Some(fx.work_dir.as_path()));
    }
    // The source is handed to ffmpeg as an absolute path
    assert_eq!(
        value_after(calls[0].get_args(), "-i").map(PathBuf::from),
        Some(fx.source.clone())
    );
}

#[test]
fn relative_tool_paths_are_anchored_outside_the_work_dir() {
    let fx = fixture();
    let runner = ScriptedRunner::default();
    let mut config = config(&fx, &["300k"], false);
    config.tools.decoder = PathBuf::from("hm/bin/TAppDecoder");

    run_experiment(&config, &runner, &NullReporter).unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 4);
    // bare names are left for the PATH lookup
    assert_eq!(calls[0].program(), Path::new("ffmpeg"));
    let decoder = calls[3].program();
    assert!(decoder.is_absolute());
    assert_eq!(decoder, std::env::current_dir().unwrap().join("hm/bin/TAppDecoder"));
}

#[test]
fn missing_encoder_summary_skips_and_still_cleans_up() {
    let fx = fixture();
    let runner = ScriptedRunner::default().with_script(
        "500k",
        Script {
            encode_stderr: BROKEN_ENCODE,
            ..Script::default()
        },
    );
    let reporter = RecordingReporter::default();

    let summary =
        run_experiment(&config(&fx, &["1000k", "500k", "250k"], false), &runner, &reporter)
            .unwrap();

    assert_eq!(summary.reports.len(), 2);
    assert_eq!(summary.reports[0].bitrate.as_str(), "1000k");
    assert_eq!(summary.reports[1].bitrate.as_str(), "250k");
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].bitrate.as_str(), "500k");
    assert!(matches!(summary.skipped[0].reason, SkipReason::EncoderLog(_)));

    // The skipped trial never reached extraction or decoding
    assert_eq!(runner.calls().len(), 4 + 2 + 4);
    assert!(reporter.events().contains(&"skipped 500k".to_string()));
    assert_no_artifacts(&fx.work_dir);
}

#[test]
fn empty_encode_is_skipped() {
    let fx = fixture();
    let runner = ScriptedRunner::default().with_script(
        "500k",
        Script {
            encode_stderr: EMPTY_ENCODE,
            ..Script::default()
        },
    );

    let summary = run_experiment(&config(&fx, &["500k"], false), &runner, &NullReporter).unwrap();

    assert!(summary.reports.is_empty());
    assert_eq!(summary.skipped[0].reason, SkipReason::EmptyEncode);
    assert_no_artifacts(&fx.work_dir);
}

#[test]
fn missing_bitstream_is_skipped() {
    let fx = fixture();
    let runner = ScriptedRunner::default().with_script(
        "500k",
        Script {
            bitstream_bytes: None,
            ..Script::default()
        },
    );

    let summary = run_experiment(&config(&fx, &["500k"], false), &runner, &NullReporter).unwrap();

    assert_eq!(summary.skipped[0].reason, SkipReason::MissingBitstream);
    // Extraction ran, the decoder did not
    assert_eq!(runner.calls().len(), 3);
    assert_no_artifacts(&fx.work_dir);
}

#[test]
fn keep_recoded_archives_each_video() {
    let fx = fixture();
    let runner = ScriptedRunner::default();

    run_experiment(&config(&fx, &["1000k", "500k"], true), &runner, &NullReporter).unwrap();

    assert!(fx.work_dir.join("1000k_recoded.mp4").exists());
    assert!(fx.work_dir.join("500k_recoded.mp4").exists());
    assert_no_artifacts(&fx.work_dir);
}

#[test]
fn decoder_launch_failure_aborts_the_run_after_cleanup() {
    let fx = fixture();
    let runner = ScriptedRunner {
        decoder_missing: true,
        ..ScriptedRunner::default()
    };

    let err = run_experiment(&config(&fx, &["1000k", "500k"], false), &runner, &NullReporter)
        .unwrap_err();

    assert!(matches!(err, CoreError::CommandStart(ref tool, _) if tool == "TAppDecoder"));
    // Aborted during the first trial
    assert_eq!(runner.calls().len(), 4);
    assert_no_artifacts(&fx.work_dir);
}

#[test]
fn missing_source_fails_before_any_tool_runs() {
    let fx = fixture();
    let config = HarnessConfigBuilder::new()
        .source_video(fx.work_dir.join("nope.mp4"))
        .work_dir(&fx.work_dir)
        .build();
    let runner = ScriptedRunner::default();

    let err = run_experiment(&config, &runner, &NullReporter).unwrap_err();

    assert!(matches!(err, CoreError::PathError(_)));
    assert!(runner.calls().is_empty());
}

#[test]
fn invalid_config_is_rejected() {
    let fx = fixture();
    let config = HarnessConfigBuilder::new()
        .source_video(&fx.source)
        .bitrates(Vec::new())
        .build();

    let err = run_experiment(&config, &ScriptedRunner::default(), &NullReporter).unwrap_err();
    assert!(matches!(err, CoreError::Config(_)));
}
