// ============================================================================
// bitcount-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for HarnessConfig
//
// Fluent construction of HarnessConfig with the defaults from config/mod.rs.
// The CLI only sets what the user overrode; everything else keeps its
// built-in value.
//
// AI-ASSISTANT-INFO: Builder pattern implementation for HarnessConfig

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::{HarnessConfig, TargetBitrate};
use crate::classify::ClassificationTable;
use crate::error::CoreResult;

/// Builder for creating HarnessConfig instances.
///
/// # Examples
///
/// ```rust
/// use bitcount_core::config::HarnessConfigBuilder;
///
/// let config = HarnessConfigBuilder::new()
///     .source_video("jellyfish.mp4")
///     .bitrate_list(&["1000k", "500k"])
///     .unwrap()
///     .decoder("/opt/hm/bin/TAppDecoder")
///     .work_dir("/tmp/sweep")
///     .build();
/// assert_eq!(config.bitrates.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HarnessConfigBuilder {
    config: HarnessConfig,
}

impl HarnessConfigBuilder {
    /// Creates a new builder holding the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source video.
    pub fn source_video(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.source_video = path.into();
        self
    }

    /// Replaces the bitrate sweep with already parsed bitrates.
    pub fn bitrates(mut self, bitrates: Vec<TargetBitrate>) -> Self {
        self.config.bitrates = bitrates;
        self
    }

    /// Replaces the bitrate sweep, parsing each literal.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for the first literal that does not parse.
    pub fn bitrate_list<S: AsRef<str>>(mut self, literals: &[S]) -> CoreResult<Self> {
        self.config.bitrates = literals
            .iter()
            .map(|literal| TargetBitrate::parse(literal.as_ref()))
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(self)
    }

    /// Keeps re-encoded videos (renamed with the bitrate prefix).
    pub fn keep_recoded(mut self, keep: bool) -> Self {
        self.config.keep_recoded = keep;
        self
    }

    /// Sets the directory where intermediates live.
    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.work_dir = dir.into();
        self
    }

    /// Sets the ffmpeg binary.
    pub fn ffmpeg(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tools.ffmpeg = path.into();
        self
    }

    /// Sets the bit-count decoder binary.
    pub fn decoder(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tools.decoder = path.into();
        self
    }

    /// Sets the audio bitrate used by both encode passes.
    pub fn audio_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.config.encoder.audio_bitrate = bitrate.into();
        self
    }

    /// Replaces the classification tables.
    pub fn classification(mut self, table: ClassificationTable) -> Self {
        self.config.classification = table;
        self
    }

    /// Builds the HarnessConfig. Call `validate()` on the result before use.
    pub fn build(self) -> HarnessConfig {
        self.config
    }
}
