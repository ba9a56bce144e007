//! Capture comparison: raw (word for word) and resync (per board).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use cscfed_core::compare::{RawCompareConfig, RawComparator, ResyncComparator, ResyncConfig};
use cscfed_core::stream::Event;
use cscfed_core::telemetry::{Stage, TelemetryTimer};

use crate::input::{self, InputFormat};
use crate::output;

// --- raw mode ---

#[derive(Args)]
pub struct CompareRawArgs {
    /// Reference capture
    a: PathBuf,

    /// Capture under test
    b: PathBuf,

    /// Read A as a local spy text capture; B events are matched by L1A
    /// and the spy-vs-DDU offsets apply
    #[arg(long)]
    spy_a: bool,

    /// JSON file overriding the comparison offsets
    #[arg(long)]
    config: Option<PathBuf>,
}

pub fn execute_raw(args: CompareRawArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => serde_json::from_str(&read_text(path)?)
            .with_context(|| format!("parsing {}", path.display()))?,
        None if args.spy_a => RawCompareConfig::spy_vs_ddu(),
        None => RawCompareConfig::ddu_vs_ddu(),
    };
    let format_a = if args.spy_a { InputFormat::Spy } else { InputFormat::Raw };

    let source_a = input::word_source(&args.a, format_a)?;
    let comparator = RawComparator::new(config);
    let mut timer = TelemetryTimer::new();

    let result = if args.spy_a {
        // the spy is prescaled: look each event up in the DDU capture by L1A
        let mut scanner = input::open_scanner(&args.b)?;
        timer.time(Stage::Compare, || {
            comparator.run_by_sequence(source_a, |id| {
                Ok(scanner
                    .next_event(Some(id))?
                    .filter(|e| e.is_complete())
                    .map(Event::into_words))
            })
        })
    } else {
        let source_b = input::word_source(&args.b, InputFormat::Raw)?;
        timer.time(Stage::Compare, || comparator.run_in_order(source_a, source_b))
    };
    let report = result.context("reading captures")?;
    timer.finish();
    output::log_timings(&timer);

    println!(
        "{} events compared: {} matched, {} empty, {} truncated captures",
        report.events_compared, report.matched, report.empty_pairs, report.tolerated_truncations
    );
    match &report.divergence {
        None => info!("no divergence"),
        Some(d) => {
            let id = d.sequence_id.map_or_else(|| "-".to_string(), |id| id.to_string());
            output::print_red(&format!("event {} (L1A {id}): {}", d.event_index, d.outcome));
            output::print_dump(&d.dump);
            warn!(event = d.event_index, "captures diverge");
        }
    }
    Ok(())
}

// --- resync mode ---

#[derive(Args)]
pub struct CompareArgs {
    /// Reference capture
    a: PathBuf,

    /// Capture under test
    b: PathBuf,

    /// Layout of capture A
    #[arg(long, value_enum, default_value = "raw")]
    format_a: InputFormat,

    /// Layout of capture B
    #[arg(long, value_enum, default_value = "raw")]
    format_b: InputFormat,

    /// JSON file with the ignored boards and sync window
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dump at most this many mismatching sub-blocks
    #[arg(long, default_value_t = 1)]
    max_dumps: usize,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

pub fn execute(args: CompareArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => ResyncConfig::from_json(&read_text(path)?)
            .with_context(|| format!("parsing {}", path.display()))?,
        None => ResyncConfig::default(),
    };

    let mut timer = TelemetryTimer::new();
    let events_a = timer.time(Stage::Read, || input::load_events(&args.a, args.format_a))?;
    let events_b = timer.time(Stage::Read, || input::load_events(&args.b, args.format_b))?;
    info!(a = events_a.len(), b = events_b.len(), "captures loaded");

    let comparator = ResyncComparator::new(config);
    let report = timer.time(Stage::Compare, || comparator.compare(&events_a, &events_b));
    timer.finish();
    output::log_timings(&timer);

    if args.json {
        return output::print_json(&report);
    }

    for finding in &report.findings {
        output::print_red(&finding.to_string());
    }
    for mismatch in report.sub_block_mismatches().take(args.max_dumps) {
        println!(
            "--- {} in event {} (L1A {}) ---",
            mismatch.origin, mismatch.event_index, mismatch.sequence_id
        );
        output::print_dump(&comparator.dump_mismatch(&events_a, &events_b, mismatch));
    }
    println!("{}", report.counters);
    if !report.is_clean() {
        warn!(findings = report.findings.len(), "captures differ");
    }
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
