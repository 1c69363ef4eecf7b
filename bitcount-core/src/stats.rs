// ============================================================================
// bitcount-core/src/stats.rs
// ============================================================================
//
// BIT ACCOUNTING: Accumulating Decoder Statistics for One Trial
//
// A fresh BitAccounting is created per trial and fed the decoder's output
// line by line. Syntax-element lines are classified and their total bits
// added to a bucket; coding-unit lines are added to the counts for their
// block size. Everything starts at zero so missing lines simply contribute
// nothing.
//
// KEY COMPONENTS:
// - CuSize / CuCounts: coding-unit block sizes and their counters
// - BucketTotals: prediction, residual and other bit sums
// - BitAccounting: per-trial accumulator plus line counters
//
// AI-ASSISTANT-INFO: Per-trial bit and coding-unit accumulation

// ---- Internal crate imports ----
use crate::classify::{Bucket, ClassificationTable};
use crate::parsing::{LineRecord, parse_line};

// ---- External crate imports ----
use log::{trace, warn};
use serde::Serialize;

// ---- Standard library imports ----
use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

// ============================================================================
// CODING UNITS
// ============================================================================

/// Coding-unit block sizes reported by the decoder, largest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CuSize {
    #[serde(rename = "64")]
    S64,
    #[serde(rename = "32")]
    S32,
    #[serde(rename = "16")]
    S16,
    #[serde(rename = "8")]
    S8,
}

impl CuSize {
    pub const ALL: [CuSize; 4] = [CuSize::S64, CuSize::S32, CuSize::S16, CuSize::S8];

    /// Edge length in pixels.
    pub fn pixels(self) -> u32 {
        match self {
            CuSize::S64 => 64,
            CuSize::S32 => 32,
            CuSize::S16 => 16,
            CuSize::S8 => 8,
        }
    }
}

impl FromStr for CuSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "64" => Ok(CuSize::S64),
            "32" => Ok(CuSize::S32),
            "16" => Ok(CuSize::S16),
            "8" => Ok(CuSize::S8),
            other => Err(format!("unsupported coding unit size: {other}")),
        }
    }
}

impl fmt::Display for CuSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pixels())
    }
}

/// Coding-unit counters for one block size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CuCounts {
    pub total: u64,
    pub inter: u64,
    pub intra: u64,
    pub skipped: u64,
    pub ipcm: u64,
}

impl AddAssign for CuCounts {
    fn add_assign(&mut self, rhs: Self) {
        add_count(&mut self.total, rhs.total);
        add_count(&mut self.inter, rhs.inter);
        add_count(&mut self.intra, rhs.intra);
        add_count(&mut self.skipped, rhs.skipped);
        add_count(&mut self.ipcm, rhs.ipcm);
    }
}

fn add_count(slot: &mut u64, value: u64) {
    *slot = slot.checked_add(value).unwrap_or_else(|| {
        warn!("Coding-unit count saturated while adding {}", value);
        u64::MAX
    });
}

/// Coding-unit counters divided by a frame count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CuAverages {
    pub total: f64,
    pub inter: f64,
    pub intra: f64,
    pub skipped: f64,
    pub ipcm: f64,
}

impl CuCounts {
    /// Average counts per frame. Zero frames yields all zeros.
    pub fn per_frame(&self, frames: u64) -> CuAverages {
        if frames == 0 {
            return CuAverages::default();
        }
        let n = frames as f64;
        CuAverages {
            total: self.total as f64 / n,
            inter: self.inter as f64 / n,
            intra: self.intra as f64 / n,
            skipped: self.skipped as f64 / n,
            ipcm: self.ipcm as f64 / n,
        }
    }
}

// ============================================================================
// BIT BUCKETS
// ============================================================================

/// Bit sums per classification bucket. Values are signed because the
/// decoder may report negative totals for alignment elements. Sums saturate
/// at the `i64` bounds instead of wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketTotals {
    pub prediction: i64,
    pub residual: i64,
    pub other: i64,
}

impl BucketTotals {
    pub fn add(&mut self, bucket: Bucket, bits: i64) {
        let slot = match bucket {
            Bucket::Prediction => &mut self.prediction,
            Bucket::Residual => &mut self.residual,
            Bucket::Other => &mut self.other,
        };
        let current = *slot;
        *slot = current.checked_add(bits).unwrap_or_else(|| {
            warn!("{:?} bit total saturated while adding {}", bucket, bits);
            current.saturating_add(bits)
        });
    }

    pub fn total(&self) -> i64 {
        self.prediction
            .saturating_add(self.residual)
            .saturating_add(self.other)
    }
}

// ============================================================================
// ACCUMULATOR
// ============================================================================

/// Everything the decoder's output contributes to one trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BitAccounting {
    pub buckets: BucketTotals,
    pub coding_units: BTreeMap<CuSize, CuCounts>,
    /// Syntax-element lines that reached a bucket.
    pub element_lines: u64,
    /// Syntax-element lines dropped by the exclusion set.
    pub excluded_lines: u64,
    pub cu_lines: u64,
    /// Lines no grammar recognised.
    pub ignored_lines: u64,
}

impl Default for BitAccounting {
    fn default() -> Self {
        Self {
            buckets: BucketTotals::default(),
            coding_units: CuSize::ALL
                .iter()
                .map(|size| (*size, CuCounts::default()))
                .collect(),
            element_lines: 0,
            excluded_lines: 0,
            cu_lines: 0,
            ignored_lines: 0,
        }
    }
}

impl BitAccounting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an accumulator from a complete decoder output.
    pub fn from_text(table: &ClassificationTable, text: &str) -> Self {
        Self::from_lines(table, text.lines())
    }

    pub fn from_lines<'a, I>(table: &ClassificationTable, lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut accounting = Self::new();
        for line in lines {
            accounting.ingest_line(table, line);
        }
        accounting
    }

    /// Parses one decoder line and folds it in. Returns whether any grammar
    /// matched.
    pub fn ingest_line(&mut self, table: &ClassificationTable, line: &str) -> bool {
        match parse_line(line) {
            Some(record) => {
                self.record(table, &record);
                true
            }
            None => {
                self.ignored_lines += 1;
                trace!("Ignoring decoder line: {}", line);
                false
            }
        }
    }

    pub fn record(&mut self, table: &ClassificationTable, record: &LineRecord) {
        match record {
            LineRecord::SyntaxElement {
                name, total_bits, ..
            } => match table.classify(name) {
                Some(bucket) => {
                    self.buckets.add(bucket, *total_bits);
                    self.element_lines += 1;
                }
                None => self.excluded_lines += 1,
            },
            LineRecord::CodingUnits { size, counts } => {
                *self.coding_units.entry(*size).or_default() += *counts;
                self.cu_lines += 1;
            }
        }
    }

    pub fn cu_counts(&self, size: CuSize) -> CuCounts {
        self.coding_units.get(&size).copied().unwrap_or_default()
    }
}
