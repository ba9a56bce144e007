//! cscfed - file tools for CSC FED / DDU event captures
//!
//! # Commands
//!
//! - `cscfed scan` - List events in a raw capture
//! - `cscfed dump` - Side-by-side dump of one event from two captures
//! - `cscfed compare-raw` - Word-for-word comparison, stops at the first divergence
//! - `cscfed compare` - Sequence-aligned per-board comparison
//! - `cscfed analyze` - Structural checks over one or more captures
//! - `cscfed frames` - Re-encode a capture into GbE test frames
//!
//! Logging goes to stderr; `-v` raises the level to debug, `RUST_LOG`
//! overrides it.

mod analyze;
mod compare;
mod dump;
mod frames;
mod input;
mod output;
mod scan;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// File tools for CSC FED / DDU event captures
#[derive(Parser)]
#[command(name = "cscfed")]
#[command(about = "Scan, compare and re-frame CSC FED / DDU event captures")]
#[command(version)]
struct Cli {
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List events in a capture
    Scan(scan::ScanArgs),

    /// Side-by-side dump of one event
    Dump(dump::DumpArgs),

    /// Word-for-word comparison of two captures
    CompareRaw(compare::CompareRawArgs),

    /// Sequence-aligned per-board comparison of two captures
    Compare(compare::CompareArgs),

    /// Structural checks over captures
    Analyze(analyze::AnalyzeArgs),

    /// Re-encode a capture into GbE test frames
    Frames(frames::FramesArgs),
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Scan(args) => scan::execute(args),
        Commands::Dump(args) => dump::execute(args),
        Commands::CompareRaw(args) => compare::execute_raw(args),
        Commands::Compare(args) => compare::execute(args),
        Commands::Analyze(args) => analyze::execute(args),
        Commands::Frames(args) => frames::execute(args),
    }
}
