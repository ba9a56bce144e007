//! Capture loading shared by the commands.

use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

use cscfed_core::stream::{open_input, Event, EventScanner, InputSource, SpyTextReader};
use cscfed_core::types::{DaqError, Word};

/// On-disk capture layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// Little-endian 64-bit words
    Raw,
    /// Text capture written by the local DAQ readout
    Spy,
}

/// Lazily read event words. Stops at EOF or at a truncated trailing event.
pub type WordSource = Box<dyn Iterator<Item = Result<Vec<Word>, DaqError>>>;

/// Capture bytes; `-` reads standard input.
pub type Input = Box<dyn BufRead + Send>;

pub fn open(path: &Path) -> Result<Input> {
    open_input(InputSource::from_arg(path)).with_context(|| format!("opening {}", path.display()))
}

pub fn open_scanner(path: &Path) -> Result<EventScanner<Input>> {
    Ok(EventScanner::new(open(path)?))
}

pub fn word_source(path: &Path, format: InputFormat) -> Result<WordSource> {
    let reader = open(path)?;
    Ok(match format {
        InputFormat::Raw => {
            let mut scanner = EventScanner::new(reader);
            Box::new(std::iter::from_fn(move || match scanner.next_event(None) {
                Ok(Some(e)) if e.is_complete() => Some(Ok(e.into_words())),
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            }))
        }
        InputFormat::Spy => {
            let mut spy = SpyTextReader::new(reader);
            Box::new(std::iter::from_fn(move || spy.next_event().transpose()))
        }
    })
}

/// Every complete event of a capture.
pub fn load_events(path: &Path, format: InputFormat) -> Result<Vec<Event>> {
    word_source(path, format)?
        .map(|words| words.map(Event::from_words))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("reading {}", path.display()))
}
