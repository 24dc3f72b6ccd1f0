use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use bitforce::io_utils::{io_cli_error, search_cli_error, simple_cli_error, CliError};
use bitforce::{count_range, hamming_distance, BruteForcer, SearchConfig, UnitWidth};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

/// Recover a buffer whose SHA-256 matches an expected digest by flipping a
/// few bits of an observed copy.
#[derive(Parser)]
#[command(name = "bitforce", version, about)]
struct Args {
    /// Observed buffer: hex string, path to a binary file, or `-` for hex on stdin
    #[arg(long)]
    input: String,

    /// Expected SHA-256 digest of the intact buffer, in hex
    #[arg(long)]
    expect: String,

    /// Smallest number of flipped bits to try
    #[arg(long, default_value_t = 0)]
    min: usize,

    /// Largest number of flipped bits to try
    #[arg(long, default_value_t = 2)]
    max: usize,

    /// Word width in bits used when applying flips (8, 16, 32 or 64)
    #[arg(long, default_value_t = 8)]
    unit: u32,

    /// Worker threads per layer, 0 for one per hardware thread
    #[arg(long, default_value_t = 0)]
    workers: usize,

    /// Print a JSON report instead of plain text
    #[arg(long)]
    json: bool,

    /// Show a progress bar on stderr
    #[arg(long)]
    progress: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report {
    found: bool,
    distance: Option<usize>,
    positions: Vec<usize>,
    buffer: Option<String>,
    search_space: u128,
    elapsed_ms: u128,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);
    match run(args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::{fmt, prelude::*};

    let filter = if verbose {
        EnvFilter::new("bitforce=debug,info")
    } else {
        EnvFilter::new("bitforce=warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn read_input(arg: &str) -> Result<Vec<u8>, CliError> {
    if arg == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| io_cli_error("reading", Path::new("<stdin>"), e))?;
        return hex::decode(buf.trim()).map_err(|_| simple_cli_error("invalid hex input"));
    }
    let path = Path::new(arg);
    if path.exists() {
        fs::read(path).map_err(|e| io_cli_error("reading input file", path, e))
    } else {
        hex::decode(arg.trim()).map_err(|_| simple_cli_error("invalid hex input"))
    }
}

/// Returns whether a matching buffer was found.
fn run(args: Args) -> Result<bool, CliError> {
    let observed = read_input(&args.input)?;
    let expected: [u8; 32] = hex::decode(args.expect.trim())
        .ok()
        .and_then(|v| v.try_into().ok())
        .ok_or_else(|| simple_cli_error("--expect must be a 64 character SHA-256 hex digest"))?;

    let unit = UnitWidth::try_from(args.unit).map_err(|e| search_cli_error("invalid unit", e))?;
    let config = SearchConfig::new(args.min, args.max)
        .with_unit(unit)
        .with_workers(args.workers);
    let search_space = count_range(observed.len() * 8, args.min, args.max)
        .map_err(|e| search_cli_error("invalid search", e))?;
    info!(bytes = observed.len(), search_space = %search_space, "starting search");

    let bar = if args.progress {
        let bar = ProgressBar::new(u64::try_from(search_space).unwrap_or(u64::MAX));
        let style = ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {per_sec} {msg}",
        )
        .map_err(|e| simple_cli_error(&format!("progress template: {e}")))?;
        bar.set_style(style);
        bar
    } else {
        ProgressBar::hidden()
    };

    let start = Instant::now();
    let found = BruteForcer::new(config)
        .with_progress(&bar)
        .search_infallible(&observed, &expected, |expected, candidate| {
            Sha256::digest(candidate)[..] == expected[..]
        })
        .map_err(|e| search_cli_error("search failed", e))?;
    bar.finish_and_clear();
    let elapsed = start.elapsed();

    if args.json {
        let report = Report {
            found: found.is_some(),
            distance: found.as_ref().map(|m| m.distance),
            positions: found.as_ref().map(|m| m.positions.clone()).unwrap_or_default(),
            buffer: found.as_ref().map(|m| hex::encode(&m.buffer)),
            search_space,
            elapsed_ms: elapsed.as_millis(),
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| simple_cli_error(&format!("serialising report: {e}")))?;
        println!("{json}");
    } else if let Some(m) = &found {
        println!("{}", hex::encode(&m.buffer));
        eprintln!(
            "Recovered at distance {} (flipped bits {:?}, hamming check {}) in {:.2?}",
            m.distance,
            m.positions,
            hamming_distance(&observed, &m.buffer),
            elapsed
        );
    } else {
        eprintln!(
            "No match within {}..={} flipped bits ({} candidates, {:.2?})",
            args.min, args.max, search_space, elapsed
        );
    }

    Ok(found.is_some())
}
