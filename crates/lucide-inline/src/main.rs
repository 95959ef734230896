//! lucide-inline CLI - Replace icon markers in a directory of HTML files.

use anyhow::{Result, bail};
use facet::Facet;
use facet_args as args;
use lucide_inline::{DEFAULT_NAME_ATTR, ProcessOptions, Processor};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Replace icon marker elements in HTML files with inline Lucide SVG icons.
///
/// Every element carrying the name attribute (`data-lucide` by default) whose value
/// is in the icon registry is replaced by an `<svg>`, including markers inside
/// `<template>` content.
#[derive(Debug, Facet)]
struct Args {
    /// Input directory containing HTML files
    #[facet(args::positional)]
    input: PathBuf,

    /// Output directory (defaults to modifying input in place)
    #[facet(args::positional, default)]
    output: Option<PathBuf>,

    /// JSON icon registry (Lucide icon-node format)
    #[facet(args::named, args::short = 'i')]
    icons: PathBuf,

    /// Attribute identifying icon markers (defaults to data-lucide)
    #[facet(args::named, default)]
    name_attr: Option<String>,

    /// Show verbose output
    #[facet(args::named, args::short = 'v', default)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args: Args = facet_args::from_std_args()?;

    let default_filter = if args.verbose { "lucide_inline=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Validate input directory
    if !args.input.exists() {
        bail!("Input directory does not exist: {}", args.input.display());
    }

    if !args.input.is_dir() {
        bail!("Input path is not a directory: {}", args.input.display());
    }

    if !args.icons.is_file() {
        bail!("Icon registry not found: {}", args.icons.display());
    }

    let mut options = ProcessOptions::new(args.input.clone(), args.icons.clone());
    options.output_dir = args.output.clone();
    options.name_attr = args
        .name_attr
        .clone()
        .unwrap_or_else(|| DEFAULT_NAME_ATTR.to_string());
    options.verbose = args.verbose;

    let mut processor = Processor::new(options);

    // Print header
    eprintln!(
        "{} Processing: {}",
        "lucide-inline".green().bold(),
        args.input.display()
    );

    if let Some(out) = &args.output {
        eprintln!("  Output: {}", out.display());
    } else {
        eprintln!("  {} Modifying in place", "Note:".yellow());
    }

    eprintln!();

    let start = Instant::now();
    let stats = processor.process()?;
    let elapsed = start.elapsed();

    eprintln!("{}", "Results:".bold());
    eprintln!(
        "  {} HTML files processed ({} rewritten)",
        stats.files_processed.to_string().cyan(),
        stats.files_modified.to_string().cyan()
    );
    eprintln!(
        "  {} icons replaced",
        stats.icons_replaced.to_string().green()
    );
    eprintln!(
        "  {} markers skipped (unknown icon)",
        stats.markers_skipped.to_string().yellow()
    );

    if !stats.unknown_icons.is_empty() {
        eprintln!(
            "\n  {} Unknown icons: {}",
            "Note:".yellow(),
            stats.unknown_icons.join(", ")
        );
    }

    eprintln!(
        "\n  Completed in {:.2}s (HTML size x{:.2}, {:.1} MB/s)",
        elapsed.as_secs_f64(),
        stats.html_inflation_ratio(),
        stats.throughput_mb_s()
    );

    Ok(())
}
