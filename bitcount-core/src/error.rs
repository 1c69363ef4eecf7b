// ============================================================================
// bitcount-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Types for the Bitcount Core Library
//
// This module defines the run-level error type. Anything surfacing as a
// CoreError aborts the whole experiment; trial-level problems are expressed
// as `SkipReason` values in the pipeline instead.
//
// KEY COMPONENTS:
// - CoreError: run-level failures (process launch, I/O, configuration)
// - CoreResult: result alias
// - Helper constructors used by the process runner
//
// AI-ASSISTANT-INFO: Error types and helpers for bitcount-core

// ---- External crate imports ----
use thiserror::Error;

// ---- Standard library imports ----
use std::io;

/// Run-level errors produced by bitcount-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An external tool could not be launched (missing binary, permissions).
    #[error("Failed to start {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A higher-level operation failed; the message carries its context.
    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for bitcount-core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds the error for a tool that could not be spawned.
pub fn command_start_error(tool: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(tool.into(), err)
}

/// Builds a configuration error from any displayable message.
pub fn config_error(message: impl std::fmt::Display) -> CoreError {
    CoreError::Config(message.to_string())
}
