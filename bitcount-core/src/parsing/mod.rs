// ============================================================================
// bitcount-core/src/parsing/mod.rs
// ============================================================================
//
// PARSING: Text Extraction from External Tool Output
//
// Neither ffmpeg nor the decoder offers a structured output format, so
// everything the harness reports is scraped from their text with regular
// expressions compiled once on first use.
//
// KEY COMPONENTS:
// - encoder_log: frame count, QP, PSNR and frame rate from pass-two stderr
// - bit_stats: per-line grammars for decoder bit statistics
//
// AI-ASSISTANT-INFO: Regex-based parsing of encoder and decoder output

pub mod bit_stats;
pub mod encoder_log;

pub use bit_stats::{Grammar, LINE_GRAMMARS, LineMatcher, LineRecord, parse_line};
pub use encoder_log::{EncoderLogError, EncoderStats, FrameType, FrameTypeStats, PsnrMean};
