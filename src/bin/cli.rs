//! hextrail CLI - Aggregate raw GPS points into H3 cell sequence datasets
//!
//! Usage:
//!   hextrail-cli aggregate <points.json> --variant <TTE|HMP|all> [--resolution N] [--output <file>]
//!
//! The input is a JSON array of point rows:
//! `{"trip_id", "longitude", "latitude", "speed", "timestamp", "attributes"}`.
//! The output is a JSON object mapping split names to records.

use clap::{Parser, Subcommand};
use hextrail::{
    AggregationConfig, AggregationOutput, AtomicProgressTracker, DatasetSplits, DropReason, H3Grid,
    RawPoint, aggregate_points, train_test_split,
};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hextrail-cli")]
#[command(about = "Aggregate GPS trajectories into H3 cell sequences", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a cell sequence dataset from raw points
    Aggregate {
        /// JSON file with raw point rows
        input: PathBuf,

        /// Dataset version: TTE (estimation), HMP (prediction) or all (raw)
        #[arg(long, default_value = "TTE")]
        variant: String,

        /// H3 resolution (required for "all", defaults to 9 otherwise)
        #[arg(short, long)]
        resolution: Option<u8>,

        /// Fraction of records placed in the test split
        #[arg(long, default_value = "0.2")]
        test_fraction: f64,

        /// Seed for the train/test shuffle
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output file for the splits (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let result = match cli.command {
        Commands::Aggregate {
            input,
            variant,
            resolution,
            test_fraction,
            seed,
            output,
        } => run_aggregate(
            &input,
            &variant,
            resolution,
            test_fraction,
            seed,
            output.as_deref(),
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Load raw point rows from a JSON file
fn load_points(path: &Path) -> hextrail::Result<Vec<RawPoint>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn run_aggregate(
    input: &Path,
    variant: &str,
    resolution: Option<u8>,
    test_fraction: f64,
    seed: u64,
    output: Option<&Path>,
) -> hextrail::Result<()> {
    // Fail on bad configuration before touching the input
    let config = AggregationConfig::from_version(variant, resolution)?;

    println!("\n{}", "=".repeat(60));
    println!("Loading points from: {}", input.display());
    println!("{}", "=".repeat(60));

    let points = load_points(input)?;
    println!("Loaded {} points", points.len());

    let progress = AtomicProgressTracker::new();
    let AggregationOutput {
        records,
        stats,
        length_band,
    } = aggregate_points(points, &config, &H3Grid, &progress)?;

    println!("\n{}", "=".repeat(60));
    println!(
        "{} dataset at resolution {}",
        config.variant.version_id(),
        config.resolution
    );
    println!("{}", "=".repeat(60));
    println!(
        "  Trajectories:           {} ({} reported)",
        stats.trajectories,
        progress.finished()
    );
    println!("  Built records:          {}", stats.built);
    for reason in DropReason::ALL {
        println!("  Dropped {:<22} {}", reason.as_str(), stats.dropped_by(reason));
    }
    println!(
        "  Direct-edge fallbacks:  {} in {} trajectories",
        stats.corridor_fallbacks, stats.trajectories_with_fallbacks
    );
    println!(
        "  Length band:            [{:.5}, {:.5}]",
        length_band.lower, length_band.upper
    );
    println!("  Outliers removed:       {}", stats.outliers_removed);
    println!("  Retained:               {}", stats.retained);

    let splits = train_test_split(records, test_fraction, seed)?;
    print_splits(&splits);

    if let Some(path) = output {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, &splits)?;
        println!("\nWrote splits to {}", path.display());
    }

    Ok(())
}

fn print_splits(splits: &DatasetSplits) {
    println!("\nSplits:");
    for name in splits.names() {
        let count = splits.get(name).map_or(0, |records| records.len());
        println!("  {:<8} {} records", name, count);
    }
}
