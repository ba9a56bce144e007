//! Re-encode a capture into GbE test frames.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Args;
use tracing::{debug, info};

use cscfed_core::constants::DEFAULT_FRAGMENT_CAPACITY;
use cscfed_core::framing::{decode_frames, AddressHeader, FrameAssembler, FrameOptions};
use cscfed_core::stream::{open_output, OutputSink};
use cscfed_core::telemetry::{Stage, TelemetryTimer, TransmitCounters};

use crate::input::{self, InputFormat};
use crate::output;

#[derive(Args)]
pub struct FramesArgs {
    /// Capture file
    input: PathBuf,

    /// Capture layout
    #[arg(short, long, value_enum, default_value = "raw")]
    format: InputFormat,

    /// Write the symbol stream here, one hex symbol per line (`-` for stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Largest fragment payload in 64-bit words
    #[arg(long, default_value_t = DEFAULT_FRAGMENT_CAPACITY)]
    capacity: usize,

    /// Prepend the default Ethernet addressing header
    #[arg(long)]
    address_header: bool,

    /// First frame counter
    #[arg(long, default_value_t = 0)]
    counter: u16,

    /// Decode every frame again and check it against the source words
    #[arg(long)]
    verify: bool,

    /// Print one summary line per frame
    #[arg(short, long)]
    list: bool,
}

pub fn execute(args: FramesArgs) -> Result<()> {
    let mut options = FrameOptions { fragment_capacity: args.capacity, ..FrameOptions::ddu() };
    if args.address_header {
        options = options.with_address_header(AddressHeader::default());
    }
    let has_header = options.address_header.is_some();
    let mut assembler = FrameAssembler::with_counter(options, args.counter)?;

    let mut sink = match &args.output {
        Some(path) => Some(
            open_output(OutputSink::from_arg(path))
                .with_context(|| format!("creating {}", path.display()))?,
        ),
        None => None,
    };

    let mut timer = TelemetryTimer::new();
    let mut counters = TransmitCounters::default();

    for (index, words) in input::word_source(&args.input, args.format)?.enumerate() {
        let words = words.with_context(|| format!("reading {}", args.input.display()))?;
        let frames = timer.time(Stage::Encode, || assembler.assemble(&words));
        let symbols: usize = frames.iter().map(|f| f.len()).sum();
        counters.add_event(words.len(), frames.len(), symbols);

        if args.list {
            for frame in &frames {
                println!("event {index}: {}", frame.summary());
            }
        }
        if args.verify {
            let decoded = timer
                .time(Stage::Unpack, || decode_frames(&frames, has_header))
                .with_context(|| format!("decoding frames of event {index}"))?;
            ensure!(decoded == words, "event {index} does not survive re-framing");
            debug!(index, frames = frames.len(), "event verified");
        }
        if let Some(out) = sink.as_mut() {
            timer.time(Stage::Transmit, || -> std::io::Result<()> {
                for symbol in frames.iter().flat_map(|f| &f.symbols) {
                    writeln!(out, "{symbol:#07x}")?;
                }
                Ok(())
            })?;
        }
    }

    if let Some(mut out) = sink {
        out.flush()?;
    }
    timer.finish();
    output::log_timings(&timer);

    println!(
        "{} events, {} frames ({} split events), {} payload words, {} symbols",
        counters.events, counters.frames, counters.split_events, counters.payload_words, counters.symbols
    );
    if args.verify {
        info!(events = counters.events, "all events verified");
    }
    Ok(())
}
