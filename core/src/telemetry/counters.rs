//! telemetry/counters.rs
//! Deterministic counters collected while scanning, comparing and sending.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Event scanner counters.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCounters {
    /// Complete events returned.
    pub events: u64,
    /// Words in complete events.
    pub words: u64,
    /// Complete events shorter than the minimum header + trailer.
    pub short_events: u64,
    /// Events cut off by the end of the source.
    pub truncated: u64,
    /// Bytes of a trailing partial word, if any.
    pub partial_tail_bytes: u64,
}

impl ScanCounters {
    /// Record one complete event.
    pub fn add_event(&mut self, len: usize, has_min_len: bool) {
        self.events += 1;
        self.words += len as u64;
        if !has_min_len {
            self.short_events += 1;
        }
    }
}

/// Resync comparator summary counters.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareCounters {
    /// Events of stream A with at least one compared sub-block.
    pub events_checked: u64,
    /// Events matched by sequence id.
    pub events_matched: u64,
    /// Events skipped on stream A while aligning ids.
    pub skipped_sync_a: u64,
    /// Events skipped on stream B while aligning ids.
    pub skipped_sync_b: u64,
    /// Sequence id mismatches outside the sync window.
    pub sequence_mismatches: u64,
    /// Matched events with a different number of sub-blocks.
    pub dmb_count_mismatches: u64,
    /// Sub-block pairs compared.
    pub sub_blocks_checked: u64,
    /// Sub-block pairs that differ in size or content.
    pub sub_blocks_mismatched: u64,
}

impl CompareCounters {
    /// No findings at all.
    pub fn is_clean(&self) -> bool {
        self.sequence_mismatches == 0
            && self.dmb_count_mismatches == 0
            && self.sub_blocks_mismatched == 0
    }
}

impl fmt::Display for CompareCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Total number of events skipped due to syncing on file1 = {}, file2 = {}",
            self.skipped_sync_a, self.skipped_sync_b
        )?;
        writeln!(
            f,
            "Total mismatched DMB blocks = {} out of {} checked",
            self.sub_blocks_mismatched, self.sub_blocks_checked
        )?;
        writeln!(f, "L1A id mismatches = {}", self.sequence_mismatches)?;
        write!(
            f,
            "Number of events with different number of DMBs = {}",
            self.dmb_count_mismatches
        )
    }
}

/// Frame transmission counters.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmitCounters {
    pub events: u64,
    pub frames: u64,
    /// Events that needed more than one frame.
    pub split_events: u64,
    pub payload_words: u64,
    pub symbols: u64,
}

impl TransmitCounters {
    /// Record one event sent as `frames` frames.
    pub fn add_event(&mut self, payload_words: usize, frames: usize, symbols: usize) {
        self.events += 1;
        self.frames += frames as u64;
        if frames > 1 {
            self.split_events += 1;
        }
        self.payload_words += payload_words as u64;
        self.symbols += symbols as u64;
    }
}
