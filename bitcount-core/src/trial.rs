// ============================================================================
// bitcount-core/src/trial.rs
// ============================================================================
//
// TRIAL RESULTS: What One Bitrate Produces
//
// A trial either completes with a TrialResult or is skipped with a reason.
// Skips are ordinary data: the experiment reports them and moves on to the
// next bitrate. Only run-level failures (a tool that cannot be launched, an
// I/O error outside cleanup) are errors.
//
// AI-ASSISTANT-INFO: Per-bitrate trial outcome types

// ---- Internal crate imports ----
use crate::config::TargetBitrate;
use crate::parsing::{EncoderLogError, EncoderStats};
use crate::stats::BitAccounting;

// ---- External crate imports ----
use serde::Serialize;

// ---- Standard library imports ----
use std::fmt;

/// Raw measurements of one completed trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialResult {
    pub bitrate: TargetBitrate,
    pub encoder: EncoderStats,
    /// Size of the extracted Annex-B stream.
    pub bitstream_bytes: u64,
    pub accounting: BitAccounting,
}

/// Why a trial produced no report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Encoder output lacked a required diagnostic.
    EncoderLog(String),
    /// The encoder reported zero frames.
    EmptyEncode,
    /// Extraction left no bitstream file behind.
    MissingBitstream,
}

impl From<EncoderLogError> for SkipReason {
    fn from(err: EncoderLogError) -> Self {
        SkipReason::EncoderLog(err.to_string())
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EncoderLog(detail) => write!(f, "{detail}"),
            SkipReason::EmptyEncode => write!(f, "encoder produced no frames"),
            SkipReason::MissingBitstream => write!(f, "no extracted bitstream"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrialOutcome {
    Completed(TrialResult),
    Skipped {
        bitrate: TargetBitrate,
        reason: SkipReason,
    },
}
