//! Implementation of the `run` subcommand.
//!
//! Turns the command-line overrides into a `HarnessConfig`, picks a reporter
//! for the requested output format, and hands both to the core pipeline.

use crate::cli::{OutputFormat, RunArgs};
use crate::error::{CliErrorContext, CliResult};
use crate::logging::get_timestamp;

use bitcount_core::config::HarnessConfigBuilder;
use bitcount_core::reporting::{JsonReporter, TableReporter, TsvReporter};
use bitcount_core::{ExperimentSummary, HarnessConfig, Reporter, SystemRunner, run_experiment};

use log::info;

/// Builds the harness configuration from command-line overrides.
/// Anything not given on the command line keeps its built-in default.
pub fn build_config(args: &RunArgs) -> CliResult<HarnessConfig> {
    let mut builder = HarnessConfigBuilder::new().keep_recoded(args.keep_recoded);

    if let Some(input) = &args.input {
        builder = builder.source_video(input);
    }
    if let Some(bitrates) = &args.bitrates {
        builder = builder
            .bitrate_list(bitrates)
            .cli_context("Invalid --bitrates value")?;
    }
    if let Some(dir) = &args.work_dir {
        builder = builder.work_dir(dir);
    }
    if let Some(ffmpeg) = &args.ffmpeg {
        builder = builder.ffmpeg(ffmpeg);
    }
    if let Some(decoder) = &args.decoder {
        builder = builder.decoder(decoder);
    }
    if let Some(audio_bitrate) = &args.audio_bitrate {
        builder = builder.audio_bitrate(audio_bitrate.as_str());
    }

    let config = builder.build();
    config.validate()?;
    Ok(config)
}

/// Reporter for the chosen output format, writing results to stdout.
pub fn reporter_for(format: OutputFormat) -> Box<dyn Reporter> {
    match format {
        OutputFormat::Table => Box::new(TableReporter::new()),
        OutputFormat::Tsv => Box::new(TsvReporter::new()),
        OutputFormat::Json => Box::new(JsonReporter::new()),
    }
}

/// Runs the full bitrate sweep with real external tools.
pub fn run_command(args: RunArgs) -> CliResult<ExperimentSummary> {
    let config = build_config(&args)?;
    let reporter = reporter_for(args.format);

    info!("hevc-bitcount run started at {}", get_timestamp());
    info!(
        "Using ffmpeg '{}' and decoder '{}'",
        config.tools.ffmpeg.display(),
        config.tools.decoder.display()
    );

    let summary = run_experiment(&config, &SystemRunner, &*reporter)?;

    info!(
        "Run finished at {}: {} of {} trial(s) reported",
        get_timestamp(),
        summary.reports.len(),
        summary.total_trials()
    );
    Ok(summary)
}
