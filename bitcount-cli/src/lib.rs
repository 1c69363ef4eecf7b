// bitcount-cli/src/lib.rs
//
// Library portion of the hevc-bitcount CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

// Re-export items needed by the binary or integration tests
pub use cli::{ClassifyArgs, Cli, Commands, OutputFormat, RunArgs};
pub use commands::classify::classify_command;
pub use commands::run::run_command;
