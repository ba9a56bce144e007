//! stream/spy_text.rs
//! Text capture format written by the local DAQ readout loop.
//!
//! ```text
//! ======================== Event 0 ========================
//! 0x500004ce73134770
//! ...
//! ==================== Num words = 6 ====================
//! ========================================================
//! ```

use std::io::{BufRead, Write};

use crate::types::{DaqError, Word};

const EVENT_BANNER: &str = "======================== Event";
const BANNER_PREFIX: &str = "========";

pub struct SpyTextReader<R: BufRead> {
    inner: R,
    line_no: usize,
    line: String,
}

impl<R: BufRead> SpyTextReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line_no: 0,
            line: String::new(),
        }
    }

    /// Words of the next event; `None` at EOF.
    pub fn next_event(&mut self) -> Result<Option<Vec<Word>>, DaqError> {
        // --- skip to the event banner ---
        loop {
            if !self.next_line()? {
                return Ok(None);
            }
            if self.line.contains(EVENT_BANNER) {
                break;
            }
        }

        // --- words until the closing banner ---
        let mut words = Vec::new();
        while self.next_line()? {
            if self.line.contains(BANNER_PREFIX) {
                break;
            }
            let text = self.line.trim();
            if text.is_empty() {
                continue;
            }
            words.push(self.parse_word(text)?);
        }

        Ok(Some(words))
    }

    /// Read every event into memory.
    pub fn collect_events(&mut self) -> Result<Vec<Vec<Word>>, DaqError> {
        let mut out = Vec::new();
        while let Some(words) = self.next_event()? {
            out.push(words);
        }
        Ok(out)
    }

    fn next_line(&mut self) -> Result<bool, DaqError> {
        self.line.clear();
        let n = self.inner.read_line(&mut self.line)?;
        if n > 0 {
            self.line_no += 1;
        }
        Ok(n > 0)
    }

    fn parse_word(&self, text: &str) -> Result<Word, DaqError> {
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        Word::from_str_radix(digits, 16).map_err(|e| DaqError::SpyText {
            line: self.line_no,
            msg: format!("{text:?}: {e}"),
        })
    }
}

pub struct SpyTextWriter<W: Write> {
    out: W,
    events_written: u64,
}

impl<W: Write> SpyTextWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, events_written: 0 }
    }

    /// Opening banner; returns the event number it carries.
    pub fn begin_event(&mut self) -> Result<u64, DaqError> {
        let n = self.events_written;
        writeln!(self.out, "======================== Event {n} ========================")?;
        Ok(n)
    }

    pub fn write_word(&mut self, word: Word) -> Result<(), DaqError> {
        writeln!(self.out, "{word:#018x}")?;
        Ok(())
    }

    /// Closing banners.
    pub fn end_event(&mut self, num_words: usize) -> Result<(), DaqError> {
        writeln!(self.out, "==================== Num words = {num_words} ====================")?;
        writeln!(self.out, "{}", "=".repeat(56))?;
        self.events_written += 1;
        Ok(())
    }

    pub fn write_event(&mut self, words: &[Word]) -> Result<(), DaqError> {
        self.begin_event()?;
        for &w in words {
            self.write_word(w)?;
        }
        self.end_event(words.len())
    }

    pub fn events_written(&self) -> u64 {
        self.events_written
    }

    pub fn flush(&mut self) -> Result<(), DaqError> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
