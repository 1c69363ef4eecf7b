//! Parsing of the diagnostic text ffmpeg and libx265 print during pass two.
//!
//! Extraction is lenient: the summary line and the input frame rate are
//! required, everything else is optional. Fields that are missing or do not
//! parse as numbers are left out rather than failing the whole trial.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use thiserror::Error;

static SUMMARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"encoded\s+(?P<frames>\d+)\s+frames(?:\s+in\s+(?P<secs>[\d.]+)s\s+\((?P<fps>[\d.]+)\s+fps\))?(?:,\s*(?P<kbps>[\d.]+)\s*kb/s)?,\s*Avg QP:\s*(?P<qp>[\d.]+)(?:,\s*Global PSNR:\s*(?P<psnr>[\d.]+))?",
    )
    .expect("Invalid encoder summary regex")
});

static VIDEO_STREAM_FPS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Stream #\d+:\d+.*Video:.*?[\s,](?P<fps>\d+(?:\.\d+)?)\s+fps\b")
        .expect("Invalid video stream regex")
});

static FRAME_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"frame\s+(?P<kind>[IPB]):\s+(?P<count>\d+),\s*Avg QP:\s*(?P<qp>[\d.]+)\s+kb/s:\s*(?P<kbps>[\d.]+)(?:\s+PSNR Mean:\s*Y:(?P<y>[\d.]+)\s+U:(?P<u>[\d.]+)\s+V:(?P<v>[\d.]+))?",
    )
    .expect("Invalid frame type regex")
});

/// Required diagnostics that were absent from the encoder output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncoderLogError {
    #[error("encoder output has no 'encoded N frames ... Avg QP' summary")]
    MissingSummary,

    #[error("encoder output has no video stream frame rate")]
    MissingFrameRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FrameType {
    I,
    P,
    B,
}

impl FrameType {
    fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "I" => Some(FrameType::I),
            "P" => Some(FrameType::P),
            "B" => Some(FrameType::B),
            _ => None,
        }
    }
}

/// Mean per-plane PSNR for one frame type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PsnrMean {
    pub y: f64,
    pub u: f64,
    pub v: f64,
}

/// Encoder statistics for one frame type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameTypeStats {
    pub count: u64,
    pub avg_qp: f64,
    pub kbps: f64,
    pub psnr: Option<PsnrMean>,
}

/// Diagnostics extracted from one second-pass encode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncoderStats {
    /// Frames encoded.
    pub frames: u64,
    /// Average quantization parameter over all frames.
    pub avg_qp: f64,
    /// Frame rate of the source video stream.
    pub frame_rate: f64,
    /// Encoding speed reported by x265 (not the video frame rate).
    pub encode_fps: Option<f64>,
    /// Bitrate as reported by the encoder.
    pub encoder_kbps: Option<f64>,
    pub global_psnr: Option<f64>,
    pub i_frames: Option<FrameTypeStats>,
    pub p_frames: Option<FrameTypeStats>,
    pub b_frames: Option<FrameTypeStats>,
}

impl EncoderStats {
    /// Extracts statistics from the captured stderr of the second pass.
    ///
    /// # Errors
    ///
    /// Fails when the summary line or the video frame rate is missing.
    pub fn parse(text: &str) -> Result<Self, EncoderLogError> {
        let summary = SUMMARY
            .captures_iter(text)
            .last()
            .ok_or(EncoderLogError::MissingSummary)?;
        let frames = summary["frames"]
            .parse::<u64>()
            .map_err(|_| EncoderLogError::MissingSummary)?;
        let avg_qp = number(&summary, "qp").ok_or(EncoderLogError::MissingSummary)?;

        let frame_rate = VIDEO_STREAM_FPS
            .captures(text)
            .and_then(|caps| number(&caps, "fps"))
            .filter(|fps| *fps > 0.0)
            .ok_or(EncoderLogError::MissingFrameRate)?;

        let mut stats = EncoderStats {
            frames,
            avg_qp,
            frame_rate,
            encode_fps: number(&summary, "fps"),
            encoder_kbps: number(&summary, "kbps"),
            global_psnr: number(&summary, "psnr"),
            i_frames: None,
            p_frames: None,
            b_frames: None,
        };

        for caps in FRAME_TYPE.captures_iter(text) {
            let Some(kind) = FrameType::from_letter(&caps["kind"]) else {
                continue;
            };
            let Some(parsed) = frame_type_stats(&caps) else {
                continue;
            };
            *stats.slot_mut(kind) = Some(parsed);
        }

        Ok(stats)
    }

    /// Playback duration of the encoded frames in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / self.frame_rate
    }

    pub fn frame_type(&self, kind: FrameType) -> Option<&FrameTypeStats> {
        match kind {
            FrameType::I => self.i_frames.as_ref(),
            FrameType::P => self.p_frames.as_ref(),
            FrameType::B => self.b_frames.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: FrameType) -> &mut Option<FrameTypeStats> {
        match kind {
            FrameType::I => &mut self.i_frames,
            FrameType::P => &mut self.p_frames,
            FrameType::B => &mut self.b_frames,
        }
    }
}

fn number(caps: &Captures<'_>, group: &str) -> Option<f64> {
    caps.name(group)?.as_str().parse().ok()
}

fn frame_type_stats(caps: &Captures<'_>) -> Option<FrameTypeStats> {
    let psnr = match (number(caps, "y"), number(caps, "u"), number(caps, "v")) {
        (Some(y), Some(u), Some(v)) => Some(PsnrMean { y, u, v }),
        _ => None,
    };
    Some(FrameTypeStats {
        count: caps["count"].parse().ok()?,
        avg_qp: number(caps, "qp")?,
        kbps: number(caps, "kbps")?,
        psnr,
    })
}
