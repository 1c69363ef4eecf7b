//! Core library for measuring where HEVC bits go across a bitrate sweep.
//!
//! For each target bitrate the source video is re-encoded with a two-pass
//! libx265 encode, the raw bitstream is extracted, and a bit-statistics build
//! of the HM reference decoder reports bits per syntax element. Those bits are
//! classified as prediction, residual or other and reported as kbit/s along
//! with PSNR, QP, frame-type counts and per-frame coding-unit statistics.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use bitcount_core::config::HarnessConfigBuilder;
//! use bitcount_core::external::SystemRunner;
//! use bitcount_core::reporting::TableReporter;
//! use bitcount_core::run_experiment;
//!
//! let config = HarnessConfigBuilder::new()
//!     .source_video("jellyfish.mp4")
//!     .bitrate_list(&["1000k", "500k"])
//!     .unwrap()
//!     .decoder("/opt/hm/bin/TAppDecoder")
//!     .build();
//!
//! let summary = run_experiment(&config, &SystemRunner, &TableReporter::new()).unwrap();
//! println!("{} trial(s) completed", summary.reports.len());
//! ```

pub mod classify;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod external;
pub mod parsing;
pub mod pipeline;
pub mod reporting;
pub mod stats;
pub mod trial;

// Re-exports for public API
pub use classify::{Bucket, ClassificationTable};
pub use config::{HarnessConfig, HarnessConfigBuilder, TargetBitrate};
pub use error::{CoreError, CoreResult};
pub use external::{ProcessRunner, SystemRunner};
pub use pipeline::{run_experiment, run_trial};
pub use reporting::{ExperimentSummary, Reporter, TrialReport};
pub use stats::{BitAccounting, BucketTotals, CuCounts, CuSize};
pub use trial::{SkipReason, TrialOutcome, TrialResult};
