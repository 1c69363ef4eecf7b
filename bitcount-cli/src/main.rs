// ============================================================================
// bitcount-cli/src/main.rs
// ============================================================================
//
// HEVC-BITCOUNT: Command-Line Entry Point
//
// Parses arguments, initialises logging and dispatches to a command. A
// finished run exits 0 even when some trials were skipped; any error that
// reaches this point is printed to stderr and exits 1.
//
// AI-ASSISTANT-INFO: Entry point for the hevc-bitcount binary

// ---- Internal crate imports ----
use bitcount_cli::{Cli, Commands, classify_command, logging, run_command};

// ---- External crate imports ----
use console::style;

// ---- Standard library imports ----
use std::process;

fn main() {
    let cli = Cli::parse_args();
    logging::init(cli.verbose);

    let result = match cli.into_command() {
        Commands::Run(args) => run_command(args).map(|_| ()),
        Commands::Classify(args) => classify_command(args),
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        process::exit(1);
    }
}
