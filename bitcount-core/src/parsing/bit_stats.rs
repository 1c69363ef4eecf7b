// ============================================================================
// bitcount-core/src/parsing/bit_stats.rs
// ============================================================================
//
// DECODER LINE GRAMMARS: Matching Bit-Accounting Decoder Output
//
// The decoder prints one statistics line per syntax element, in one of two
// layouts depending on the entropy coder, plus one summary line per
// coding-unit size. Each layout is a named matcher: a pure function from a
// line to an optional record. Matchers are tried in a fixed order and the
// first hit wins; the layouts differ in field count and separators, so at
// most one can match any line. Lines matching nothing are ignored.
//
// GRAMMARS:
// - CABAC:  name : <col> <col> <5..7 integers, last = total bits> (pct)
// - CAVLC:  name : - - <a> <b> <c> <total bits> (pct)
// - CUs:    <64|32|16|8> CUs: <total> <inter> <intra> <skipped> <ipcm>
//
// AI-ASSISTANT-INFO: Line grammars for bit-accounting decoder output

// ---- Internal crate imports ----
use crate::stats::{CuCounts, CuSize};

// ---- External crate imports ----
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static CABAC_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?P<name>\S+)\s+:\s+\S+\s+\S+(?P<values>(?:\s+-?\d+){5,7})\s+\(\s*-?\d+(?:\.\d+)?%?\s*\)\s*$",
    )
    .expect("Invalid CABAC line regex")
});

static CAVLC_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?P<name>\S+)\s+:\s+-\s+-\s+-?\d+\s+-?\d+\s+-?\d+\s+(?P<total>-?\d+)\s+\(\s*-?\d+(?:\.\d+)?%?\s*\)\s*$",
    )
    .expect("Invalid CAVLC line regex")
});

static CU_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?P<size>64|32|16|8)\s+CUs:\s+(?P<total>\d+)\s+(?P<inter>\d+)\s+(?P<intra>\d+)\s+(?P<skipped>\d+)\s+(?P<ipcm>\d+)\s*$",
    )
    .expect("Invalid CU line regex")
});

/// The line layouts the decoder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grammar {
    /// Arithmetic-coding statistics row.
    Cabac,
    /// Variable-length-coding statistics row.
    Cavlc,
    /// Coding-unit count summary row.
    CodingUnits,
}

/// A recognised decoder line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRecord {
    SyntaxElement {
        name: String,
        grammar: Grammar,
        total_bits: i64,
    },
    CodingUnits {
        size: CuSize,
        counts: CuCounts,
    },
}

/// A named line matcher.
pub type LineMatcher = fn(&str) -> Option<LineRecord>;

/// All matchers, in the order they are tried.
pub const LINE_GRAMMARS: &[(Grammar, LineMatcher)] = &[
    (Grammar::Cabac, match_cabac),
    (Grammar::Cavlc, match_cavlc),
    (Grammar::CodingUnits, match_coding_units),
];

/// Matches one decoder output line against every grammar in order.
pub fn parse_line(line: &str) -> Option<LineRecord> {
    LINE_GRAMMARS.iter().find_map(|(_, matcher)| matcher(line))
}

/// CABAC layout: two column tokens then five to seven integers; the last
/// integer is the element's total bits.
pub fn match_cabac(line: &str) -> Option<LineRecord> {
    let caps = CABAC_LINE.captures(line)?;
    let total_bits = caps["values"].split_whitespace().last()?.parse().ok()?;
    Some(LineRecord::SyntaxElement {
        name: caps["name"].to_string(),
        grammar: Grammar::Cabac,
        total_bits,
    })
}

/// CAVLC layout: `- -` then four integers; the fourth is total bits.
pub fn match_cavlc(line: &str) -> Option<LineRecord> {
    let caps = CAVLC_LINE.captures(line)?;
    Some(LineRecord::SyntaxElement {
        name: caps["name"].to_string(),
        grammar: Grammar::Cavlc,
        total_bits: caps["total"].parse().ok()?,
    })
}

/// Coding-unit summary for one block size.
pub fn match_coding_units(line: &str) -> Option<LineRecord> {
    let caps = CU_LINE.captures(line)?;
    let size = caps["size"].parse::<CuSize>().ok()?;
    let count = |group: &str| caps[group].parse::<u64>().ok();
    Some(LineRecord::CodingUnits {
        size,
        counts: CuCounts {
            total: count("total")?,
            inter: count("inter")?,
            intra: count("intra")?,
            skipped: count("skipped")?,
            ipcm: count("ipcm")?,
        },
    })
}
