//! Configuration structures and constants for the bitcount-core library.
//!
//! A [`HarnessConfig`] is built once at start-up and passed by reference into
//! the pipeline. Nothing in it changes while the experiment runs.

mod bitrate;
mod builder;

use std::collections::HashSet;
use std::path::PathBuf;

use crate::classify::ClassificationTable;
use crate::error::{CoreResult, config_error};

pub use bitrate::TargetBitrate;
pub use builder::HarnessConfigBuilder;

// Default constants

/// Source video re-encoded at every bitrate.
pub const DEFAULT_SOURCE_VIDEO: &str = "jellyfish.mp4";

/// Bitrates swept by default, highest first.
pub const DEFAULT_BITRATES: &[&str] = &[
    "100000k", "80000k", "60000k", "40000k", "20000k", "10000k", "5000k", "1000k", "500k", "250k",
];

/// ffmpeg binary used for both encode passes and the bitstream extraction.
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// HM reference decoder built with bit statistics enabled.
pub const DEFAULT_DECODER: &str = "TAppDecoder";

pub const DEFAULT_VIDEO_CODEC: &str = "libx265";
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";

/// Re-encoded container written by the second pass.
pub const DEFAULT_RECODED_VIDEO: &str = "recoded.mp4";

/// Annex-B elementary stream handed to the decoder.
pub const DEFAULT_BITSTREAM: &str = "recoded.h265";

/// Rate-control statistics written by libx265 during pass one.
pub const DEFAULT_RATE_CONTROL_LOG: &str = "x265_2pass.log";

/// Companion cu-tree statistics written next to the rate-control log.
pub const DEFAULT_RATE_CONTROL_CUTREE: &str = "x265_2pass.log.cutree";

/// Paths of the external programs the harness drives.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub decoder: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from(DEFAULT_FFMPEG),
            decoder: PathBuf::from(DEFAULT_DECODER),
        }
    }
}

/// Codec selection for the two encode passes.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderSettings {
    pub video_codec: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
        }
    }
}

/// Fixed file names of the per-trial intermediates, relative to the
/// working directory. Every trial reuses the same names.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactNames {
    pub recoded_video: String,
    pub bitstream: String,
    pub rate_control_log: String,
    pub rate_control_cutree: String,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            recoded_video: DEFAULT_RECODED_VIDEO.to_string(),
            bitstream: DEFAULT_BITSTREAM.to_string(),
            rate_control_log: DEFAULT_RATE_CONTROL_LOG.to_string(),
            rate_control_cutree: DEFAULT_RATE_CONTROL_CUTREE.to_string(),
        }
    }
}

impl ArtifactNames {
    /// Name the re-encoded video is archived under when retention is on.
    pub fn archived_video(&self, bitrate: &TargetBitrate) -> String {
        format!("{}_{}", bitrate.as_str(), self.recoded_video)
    }
}

/// Main configuration structure for the harness.
///
/// Usually created by the CLI through [`HarnessConfigBuilder`] and checked
/// with [`HarnessConfig::validate`] before the experiment starts.
///
/// # Examples
///
/// ```rust
/// use bitcount_core::config::HarnessConfigBuilder;
///
/// let config = HarnessConfigBuilder::new()
///     .source_video("clip.mp4")
///     .bitrate_list(&["400k", "300k"])
///     .unwrap()
///     .keep_recoded(true)
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Video re-encoded at every bitrate
    pub source_video: PathBuf,

    /// Target bitrates in report order
    pub bitrates: Vec<TargetBitrate>,

    /// Keep each re-encoded video, renamed with its bitrate as prefix
    pub keep_recoded: bool,

    /// Directory holding the intermediates; external tools run inside it
    pub work_dir: PathBuf,

    pub tools: ToolPaths,

    pub encoder: EncoderSettings,

    pub artifacts: ArtifactNames,

    /// Syntax-element bucket tables
    pub classification: ClassificationTable,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            source_video: PathBuf::from(DEFAULT_SOURCE_VIDEO),
            bitrates: default_bitrates(),
            keep_recoded: false,
            work_dir: PathBuf::from("."),
            tools: ToolPaths::default(),
            encoder: EncoderSettings::default(),
            artifacts: ArtifactNames::default(),
            classification: ClassificationTable::default(),
        }
    }
}

impl HarnessConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> CoreResult<()> {
        if self.source_video.as_os_str().is_empty() {
            return Err(config_error("source video path must not be empty"));
        }

        if self.bitrates.is_empty() {
            return Err(config_error("at least one target bitrate is required"));
        }

        if self.encoder.video_codec.trim().is_empty() {
            return Err(config_error("video codec must not be empty"));
        }

        if self.encoder.audio_bitrate.trim().is_empty() {
            return Err(config_error("audio bitrate must not be empty"));
        }

        let names = [
            &self.artifacts.recoded_video,
            &self.artifacts.bitstream,
            &self.artifacts.rate_control_log,
            &self.artifacts.rate_control_cutree,
        ];
        if names.iter().any(|name| name.trim().is_empty()) {
            return Err(config_error("artifact file names must not be empty"));
        }
        let unique: HashSet<&String> = names.iter().copied().collect();
        if unique.len() != names.len() {
            return Err(config_error("artifact file names must be distinct"));
        }

        self.classification.validate()
    }
}

/// The built-in bitrate sweep.
pub fn default_bitrates() -> Vec<TargetBitrate> {
    DEFAULT_BITRATES
        .iter()
        .filter_map(|literal| TargetBitrate::parse(literal).ok())
        .collect()
}
