//! Implementation of the `classify` subcommand.
//!
//! Applies the default classification tables to a decoder output that was
//! captured earlier, e.g. with `TAppDecoder -b recoded.h265 > bits.txt`.

use crate::cli::ClassifyArgs;
use crate::error::{CliErrorContext, CliResult};

use bitcount_core::stats::BitAccounting;
use bitcount_core::{ClassificationTable, CuSize};

use console::style;
use log::debug;
use std::fmt::Write as _;
use std::fs;

/// Classifies the file named in `args` and prints the result to stdout.
pub fn classify_command(args: ClassifyArgs) -> CliResult<()> {
    let text = fs::read_to_string(&args.file)
        .cli_with_context(|| format!("Failed to read decoder output '{}'", args.file.display()))?;

    let accounting = BitAccounting::from_text(&ClassificationTable::default(), &text);
    debug!(
        "Classified {} line(s) from {}",
        text.lines().count(),
        args.file.display()
    );

    let rendered = if args.json {
        serde_json::to_string_pretty(&accounting)?
    } else {
        render_text(&accounting)
    };
    println!("{rendered}");
    Ok(())
}

/// Human-readable summary of bucket totals, line counters and CU totals.
pub fn render_text(accounting: &BitAccounting) -> String {
    let buckets = &accounting.buckets;
    let mut out = String::new();

    let _ = writeln!(out, "{}", style("BITS").bold().cyan());
    for (label, value) in [
        ("Prediction:", buckets.prediction),
        ("Residual:", buckets.residual),
        ("Other:", buckets.other),
        ("Total:", buckets.total()),
    ] {
        let _ = writeln!(out, "  {:<12} {:>14}", style(label).bold(), value);
    }

    let _ = writeln!(out, "\n{}", style("LINES").bold().cyan());
    for (label, value) in [
        ("Elements:", accounting.element_lines),
        ("Excluded:", accounting.excluded_lines),
        ("CU:", accounting.cu_lines),
        ("Ignored:", accounting.ignored_lines),
    ] {
        let _ = writeln!(out, "  {:<12} {:>14}", style(label).bold(), value);
    }

    let _ = writeln!(out, "\n{}", style("CODING UNITS").bold().cyan());
    let _ = writeln!(
        out,
        "  {:>4} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "size", "total", "inter", "intra", "skip", "ipcm"
    );
    for size in CuSize::ALL {
        let counts = accounting.cu_counts(size);
        let _ = writeln!(
            out,
            "  {:>4} {:>10} {:>10} {:>10} {:>10} {:>10}",
            size.to_string(),
            counts.total,
            counts.inter,
            counts.intra,
            counts.skipped,
            counts.ipcm
        );
    }

    out.trim_end().to_string()
}
