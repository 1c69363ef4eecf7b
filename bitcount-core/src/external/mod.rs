// ============================================================================
// bitcount-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and the Bit-Count Decoder
//
// This module encapsulates every interaction with third-party programs. The
// argument builders are pure functions of the configuration; execution goes
// through the ProcessRunner trait so tests can script tool behaviour.
//
// KEY COMPONENTS:
// - ProcessRunner / SystemRunner: blocking process execution
// - ffmpeg: two-pass encode and bitstream extraction commands
// - decoder: bit-accounting decoder command
//
// AI-ASSISTANT-INFO: External tool interactions for the harness

// ============================================================================
// SUBMODULES
// ============================================================================

/// ffmpeg argument building for the encode and extraction stages
pub mod ffmpeg;

/// Bit-count decoder argument building
pub mod decoder;

/// Process execution trait and its std::process implementation
pub mod runner;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use decoder::build_decoder_command;
pub use ffmpeg::{EncodePass, EncodeParams, build_encode_command, build_extract_command, null_sink};
pub use runner::{Capture, CommandOutput, ProcessRunner, SystemRunner, ToolCommand};
