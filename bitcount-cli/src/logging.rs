// ============================================================================
// bitcount-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger Initialisation and Timestamps
//
// The core library only talks to the `log` facade. The CLI installs
// env_logger as the backend, writing timestamped, level-tagged lines to
// stderr so stdout stays reserved for results.
//
// USAGE:
// - default: info
// - --verbose: debug
// - RUST_LOG=...: overrides both (e.g. RUST_LOG=bitcount_core=trace)
//
// AI-ASSISTANT-INFO: Logger initialisation for the CLI

// ---- External crate imports ----
use console::style;
use log::{LevelFilter, debug};

// ---- Standard library imports ----
use std::io::Write;

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Level used when RUST_LOG is not set.
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initialises env_logger. Safe to call once per process.
pub fn init(verbose: bool) {
    let level = default_level(verbose);

    let result = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            let level_tag = match record.level() {
                log::Level::Error => style("ERROR").red().bold(),
                log::Level::Warn => style("WARN ").yellow(),
                log::Level::Info => style("INFO ").green(),
                log::Level::Debug => style("DEBUG").blue(),
                log::Level::Trace => style("TRACE").magenta(),
            };
            writeln!(
                buf,
                "{} {} {}",
                style(chrono::Local::now().format("%Y-%m-%d %H:%M:%S")).dim(),
                level_tag,
                record.args()
            )
        })
        .try_init();

    if result.is_ok() {
        debug!("Logger initialized with level: {}", level);
    }
}
