//! ffmpeg command building for the encode and extraction stages.
//!
//! Both encode passes use libx265 at the trial's target bitrate. Pass one only
//! gathers rate-control statistics, so its output goes to the null sink. Pass
//! two writes the re-encoded container and, with `psnr=1`, prints the PSNR
//! figures the report needs. Extraction copies the video stream into a raw
//! Annex-B file through the `hevc_mp4toannexb` bitstream filter.

use crate::config::{HarnessConfig, TargetBitrate};
use crate::external::runner::ToolCommand;

use std::path::{Path, PathBuf};

/// The platform's null output sink.
pub fn null_sink() -> &'static str {
    if cfg!(windows) { "NUL" } else { "/dev/null" }
}

/// Which of the two encode passes to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodePass {
    First,
    Second,
}

impl EncodePass {
    /// Value handed to `-x265-params`.
    fn x265_params(self) -> &'static str {
        match self {
            EncodePass::First => "pass=1",
            EncodePass::Second => "pass=2:psnr=1",
        }
    }
}

/// Parameters for one encode pass.
#[derive(Debug, Clone)]
pub struct EncodeParams {
    pub source: PathBuf,
    pub bitrate: TargetBitrate,
    pub pass: EncodePass,
}

/// Builds one pass of the two-pass encode.
///
/// The command runs inside the working directory, where libx265 writes its
/// rate-control logs and pass two writes the re-encoded video.
pub fn build_encode_command(config: &HarnessConfig, params: &EncodeParams) -> ToolCommand {
    let output = match params.pass {
        EncodePass::First => null_sink().to_string(),
        EncodePass::Second => config.artifacts.recoded_video.clone(),
    };

    let cmd = ToolCommand::new(&config.tools.ffmpeg)
        .current_dir(&config.work_dir)
        .arg("-y")
        .args(["-i".to_string(), path_arg(&params.source)])
        .args(["-c:v", config.encoder.video_codec.as_str()])
        .args(["-b:v", params.bitrate.as_str()])
        .args(["-x265-params", params.pass.x265_params()])
        .args(["-c:a", config.encoder.audio_codec.as_str()])
        .args(["-b:a", config.encoder.audio_bitrate.as_str()]);

    match params.pass {
        EncodePass::First => cmd.args(["-f", "mp4"]).arg(output),
        EncodePass::Second => cmd.arg(output),
    }
}

/// Builds the stream-copy extraction of the raw HEVC elementary stream.
pub fn build_extract_command(config: &HarnessConfig) -> ToolCommand {
    ToolCommand::new(&config.tools.ffmpeg)
        .current_dir(&config.work_dir)
        .arg("-y")
        .args(["-i", config.artifacts.recoded_video.as_str()])
        .args(["-c:v", "copy"])
        .args(["-bsf:v", "hevc_mp4toannexb"])
        .arg("-an")
        .arg(config.artifacts.bitstream.as_str())
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
