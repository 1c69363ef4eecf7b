//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// The bitrate sweep itself.
pub mod run;

/// Offline classification of a captured decoder output.
pub mod classify;
