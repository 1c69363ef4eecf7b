// bitcount-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Args, CommandFactory, FromArgMatches, Parser, Subcommand, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "hevc-bitcount: where do HEVC bits go?",
    long_about = "Re-encodes a video at a sweep of bitrates with libx265, runs a bit-statistics \
                  build of the HM decoder on each result, and reports prediction, residual and \
                  other bits per second alongside PSNR, QP and coding-unit statistics."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Options for the implied `run` command
    #[command(flatten)]
    pub run: RunArgs,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    /// Parses the process arguments, exiting with a usage error on failure.
    pub fn parse_args() -> Self {
        Self::try_parse_args(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    /// Parses `args`, rejecting top-level run options given alongside an
    /// explicit subcommand. Global flags such as `--verbose` may appear on
    /// either side of the subcommand.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut command = Self::command();
        let matches = command.try_get_matches_from_mut(args)?;
        let cli = Self::from_arg_matches(&matches)?;

        if let Some(subcommand) = matches.subcommand_name() {
            let stray = command
                .get_arguments()
                .filter(|arg| !arg.is_global_set())
                .find(|arg| {
                    matches.value_source(arg.get_id().as_str()) == Some(ValueSource::CommandLine)
                });
            if let Some(arg) = stray {
                let flag = arg
                    .get_long()
                    .map(|long| format!("--{long}"))
                    .unwrap_or_else(|| arg.get_id().to_string());
                return Err(command.error(
                    ErrorKind::ArgumentConflict,
                    format!("'{flag}' cannot be used before the '{subcommand}' subcommand"),
                ));
            }
        }

        Ok(cli)
    }

    /// The command to execute; `run` when none was named.
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Run(self.run))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Runs the bitrate sweep (the default)
    Run(RunArgs),
    /// Classifies a saved decoder `-b` output without running any tools
    Classify(ClassifyArgs),
}

/// How completed trials are printed.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Fixed-width table with progress on stderr
    #[default]
    Table,
    /// Tab-separated header and rows
    Tsv,
    /// One JSON object per event
    Json,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Source video (defaults to jellyfish.mp4)
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Comma-separated target bitrates, e.g. 1000k,500k,2M
    #[arg(short = 'b', long, value_delimiter = ',', value_name = "LIST")]
    pub bitrates: Option<Vec<String>>,

    /// Keep each re-encoded video as <bitrate>_recoded.mp4
    #[arg(long, default_value_t = false)]
    pub keep_recoded: bool,

    /// Directory for intermediate files (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// ffmpeg binary with libx265 support
    #[arg(long, value_name = "PATH", env = "HEVC_BITCOUNT_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// HM decoder built with bit statistics enabled
    #[arg(long, value_name = "PATH", env = "HEVC_BITCOUNT_DECODER")]
    pub decoder: Option<PathBuf>,

    /// Audio bitrate for both encode passes
    #[arg(long, value_name = "RATE")]
    pub audio_bitrate: Option<String>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct ClassifyArgs {
    /// File holding captured decoder output
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the result as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
