// ============================================================================
// bitcount-core/src/config/bitrate.rs
// ============================================================================
//
// TARGET BITRATES: Encoder Bitrate Strings with a Known Numeric Value
//
// A target bitrate keeps the exact literal handed to the encoder ("300k",
// "2M", "800000") alongside its value in kbit/s, so the report can show the
// configured string while rate maths works on numbers.
//
// AI-ASSISTANT-INFO: Target bitrate parsing for the encode stage

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult, config_error};

// ---- External crate imports ----
use serde::{Serialize, Serializer};

// ---- Standard library imports ----
use std::fmt;
use std::str::FromStr;

/// A target bitrate as passed to the encoder's `-b:v` option.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetBitrate {
    literal: String,
    kbps: f64,
}

enum Unit {
    Bits,
    Kilo,
    Mega,
}

impl TargetBitrate {
    /// Parses a bitrate literal with an optional `k`/`K` or `m`/`M` suffix.
    /// A bare number is taken as bit/s, the encoder's own convention.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let literal = input.trim();
        if literal.is_empty() {
            return Err(config_error("bitrate must not be empty"));
        }

        let (number, unit) = match literal.char_indices().last() {
            Some((idx, 'k' | 'K')) => (&literal[..idx], Unit::Kilo),
            Some((idx, 'm' | 'M')) => (&literal[..idx], Unit::Mega),
            Some((_, c)) if c.is_ascii_digit() => (literal, Unit::Bits),
            _ => {
                return Err(config_error(format!(
                    "bitrate '{literal}' has an unknown unit suffix (expected k or M)"
                )));
            }
        };

        let value: f64 = number
            .parse()
            .map_err(|_| config_error(format!("bitrate '{literal}' is not a number")))?;
        if !value.is_finite() || value <= 0.0 {
            return Err(config_error(format!("bitrate '{literal}' must be positive")));
        }

        Ok(Self {
            literal: literal.to_string(),
            kbps: match unit {
                Unit::Bits => value / 1000.0,
                Unit::Kilo => value,
                Unit::Mega => value * 1000.0,
            },
        })
    }

    /// The literal handed to the encoder.
    pub fn as_str(&self) -> &str {
        &self.literal
    }

    /// Target rate in kbit/s.
    pub fn kbps(&self) -> f64 {
        self.kbps
    }
}

impl FromStr for TargetBitrate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetBitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

impl Serialize for TargetBitrate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.literal)
    }
}
