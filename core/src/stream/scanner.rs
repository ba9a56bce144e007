//! stream/scanner.rs
//! Boundary scanner: finds DDU events in a raw word stream.
//!
//! The stream carries no length prefix. Event starts are recognized on a
//! two-word window (`previous`, `current`) and ends on the trailer-2 sentinel,
//! after which exactly two more trailer words are taken.

use std::io::Read;

use tracing::{debug, warn};

use crate::constants::{
    DDU_HEADER1, DDU_HEADER1_MASK, DDU_HEADER2, DDU_HEADER2_MASK, DDU_TRAILER2, DDU_TRAILER_TAIL,
};
use crate::stream::event::{sequence_id_of, Event};
use crate::stream::io::WordReader;
use crate::telemetry::ScanCounters;
use crate::types::{DaqError, SequenceId, Word};

/// `true` when (`previous`, `current`) is a DDU header pair.
#[inline]
pub fn is_event_start(previous: Word, current: Word) -> bool {
    (current & DDU_HEADER2_MASK) == DDU_HEADER2 && (previous & DDU_HEADER1_MASK) == DDU_HEADER1
}

pub struct EventScanner<R: Read> {
    reader: WordReader<R>,
    counters: ScanCounters,
}

impl<R: Read> EventScanner<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: WordReader::new(inner),
            counters: ScanCounters::default(),
        }
    }

    /// Next event, optionally only the one carrying `wanted`.
    ///
    /// - `Ok(None)`: the source ran out before a start was found.
    /// - `Ok(Some(e))` with `!e.is_complete()`: the source ran out mid-event;
    ///   `e` holds what was collected.
    ///
    /// A `wanted` id that never occurs consumes the stream to EOF.
    pub fn next_event(&mut self, wanted: Option<SequenceId>) -> Result<Option<Event>, DaqError> {
        let mut previous: Word = 0;
        let mut current: Word = 0;

        // --- find the header pair ---
        loop {
            if is_event_start(previous, current)
                && wanted.map_or(true, |id| sequence_id_of(previous) == id)
            {
                break;
            }
            previous = current;
            current = match self.reader.read_word()? {
                Some(w) => w,
                None => {
                    self.note_eof();
                    return Ok(None);
                }
            };
        }

        let start_offset = self.reader.byte_offset() - 16;
        let mut words = vec![previous, current];

        // --- collect until trailer-2 ---
        while current != DDU_TRAILER2 {
            current = match self.reader.read_word()? {
                Some(w) => w,
                None => return Ok(Some(self.truncated(words, start_offset))),
            };
            words.push(current);
        }

        // --- remaining trailer words ---
        for _ in 0..DDU_TRAILER_TAIL {
            match self.reader.read_word()? {
                Some(w) => words.push(w),
                None => return Ok(Some(self.truncated(words, start_offset))),
            }
        }

        let event = Event::new(words, true);
        self.counters.add_event(event.len(), event.has_min_len());
        debug!(
            l1a = sequence_id_of(event.words()[0]),
            words = event.len(),
            offset = start_offset,
            "event decoded"
        );
        Ok(Some(event))
    }

    /// Iterate complete events until EOF or the first truncated event.
    pub fn events(&mut self) -> Events<'_, R> {
        Events { scanner: self, done: false }
    }

    /// Read every complete event into memory.
    pub fn collect_events(&mut self) -> Result<Vec<Event>, DaqError> {
        self.events().collect()
    }

    pub fn counters(&self) -> &ScanCounters {
        &self.counters
    }

    pub fn words_read(&self) -> u64 {
        self.reader.words_read()
    }

    fn truncated(&mut self, words: Vec<Word>, start_offset: u64) -> Event {
        warn!(
            words = words.len(),
            offset = start_offset,
            "stream ended inside an event"
        );
        self.counters.truncated += 1;
        self.note_eof();
        Event::new(words, false)
    }

    fn note_eof(&mut self) {
        if self.reader.partial_tail() > 0 {
            self.counters.partial_tail_bytes = self.reader.partial_tail() as u64;
        }
    }
}

/// Iterator over complete events. Stops (without error) at the first
/// truncated event; I/O errors are yielded once and end iteration.
pub struct Events<'a, R: Read> {
    scanner: &'a mut EventScanner<R>,
    done: bool,
}

impl<R: Read> Iterator for Events<'_, R> {
    type Item = Result<Event, DaqError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.scanner.next_event(None) {
            Ok(Some(event)) if event.is_complete() => Some(Ok(event)),
            Ok(_) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
