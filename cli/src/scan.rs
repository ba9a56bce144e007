//! List events in a capture.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use cscfed_core::stream::{open_output, OutputSink, WordWriter};
use cscfed_core::telemetry::{Stage, TelemetryTimer};

use crate::input::{self, InputFormat};
use crate::output;

#[derive(Args)]
pub struct ScanArgs {
    /// Capture file
    input: PathBuf,

    /// Capture layout
    #[arg(short, long, value_enum, default_value = "raw")]
    format: InputFormat,

    /// Print one line per event
    #[arg(short, long)]
    list: bool,

    /// Print the scan counters as JSON
    #[arg(long)]
    json: bool,

    /// Copy complete events to this raw file (`-` for stdout)
    #[arg(long)]
    extract: Option<PathBuf>,
}

pub fn execute(args: ScanArgs) -> Result<()> {
    let mut extract = match &args.extract {
        Some(path) => Some(WordWriter::new(
            open_output(OutputSink::from_arg(path))
                .with_context(|| format!("creating {}", path.display()))?,
        )),
        None => None,
    };

    let mut timer = TelemetryTimer::new();
    match args.format {
        InputFormat::Raw => scan_raw(&args, &mut timer, extract.as_mut())?,
        InputFormat::Spy => scan_spy(&args, &mut timer, extract.as_mut())?,
    }
    if let Some(mut writer) = extract {
        writer.flush()?;
        info!(words = writer.words_written(), "events extracted");
    }
    timer.finish();
    output::log_timings(&timer);
    Ok(())
}

type Extract = WordWriter<Box<dyn Write + Send>>;

fn scan_raw(args: &ScanArgs, timer: &mut TelemetryTimer, mut extract: Option<&mut Extract>) -> Result<()> {
    let mut scanner = input::open_scanner(&args.input)?;
    let mut index = 0usize;
    loop {
        let event = timer
            .time(Stage::Read, || scanner.next_event(None))
            .with_context(|| format!("scanning {}", args.input.display()))?;
        let Some(event) = event else { break };

        if args.list {
            let id = event
                .sequence_id()
                .map_or_else(|| "-".to_string(), |id| id.to_string());
            let mut line = format!("event {index}: L1A {id}, {} words", event.len());
            if !event.is_complete() {
                line.push_str(", truncated");
            } else if !event.has_min_len() {
                line.push_str(", short");
            }
            println!("{line}");
        }
        index += 1;
        if !event.is_complete() {
            break;
        }
        if let Some(writer) = extract.as_deref_mut() {
            writer.write_words(event.words())?;
        }
    }

    let counters = scanner.counters();
    if args.json {
        output::print_json(counters)?;
    } else {
        println!(
            "{} events, {} words, {} short, {} truncated",
            counters.events, counters.words, counters.short_events, counters.truncated
        );
        if counters.partial_tail_bytes > 0 {
            println!("{} trailing bytes ignored", counters.partial_tail_bytes);
        }
    }
    info!(path = %args.input.display(), events = counters.events, "scan finished");
    Ok(())
}

fn scan_spy(args: &ScanArgs, timer: &mut TelemetryTimer, extract: Option<&mut Extract>) -> Result<()> {
    let events = timer.time(Stage::Read, || input::load_events(&args.input, InputFormat::Spy))?;
    let words: usize = events.iter().map(|e| e.len()).sum();
    if let Some(writer) = extract {
        for event in &events {
            writer.write_words(event.words())?;
        }
    }

    if args.list {
        for (index, event) in events.iter().enumerate() {
            let id = event
                .sequence_id()
                .map_or_else(|| "-".to_string(), |id| id.to_string());
            println!("event {index}: L1A {id}, {} words", event.len());
        }
    }
    if args.json {
        output::print_json(&serde_json::json!({ "events": events.len(), "words": words }))?;
    } else {
        println!("{} events, {words} words", events.len());
    }
    info!(path = %args.input.display(), events = events.len(), "scan finished");
    Ok(())
}
