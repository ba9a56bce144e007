use std::fmt;

use serde::Serialize;

use crate::compare::dump::DumpLine;
use crate::telemetry::CompareCounters;
use crate::types::{SequenceId, Word};
use crate::unpack::OriginId;

// ================= Raw mode =================

/// Result of comparing one event pair word for word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RawOutcome {
    Match,
    /// Both sides have the known empty-event lengths.
    EmptyPair,
    /// One side hit the capture cap; the overlap matched.
    TruncationTolerated { len_a: usize, len_b: usize },
    LengthMismatch { len_a: usize, len_b: usize },
    /// `index` is the offset into `b`; `a` is read at `index + offset`.
    WordMismatch { index: usize, a: Word, b: Word },
}

impl RawOutcome {
    pub fn is_divergence(&self) -> bool {
        matches!(self, RawOutcome::LengthMismatch { .. } | RawOutcome::WordMismatch { .. })
    }
}

impl fmt::Display for RawOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawOutcome::Match => f.write_str("match"),
            RawOutcome::EmptyPair => f.write_str("empty event pair"),
            RawOutcome::TruncationTolerated { len_a, len_b } => {
                write!(f, "capture truncated ({len_a} vs {len_b} words), overlap matches")
            }
            RawOutcome::LengthMismatch { len_a, len_b } => {
                write!(f, "event size mismatch: {len_a} vs {len_b} words")
            }
            RawOutcome::WordMismatch { index, a, b } => {
                write!(f, "word mismatch at {index}: {a:#018x} vs {b:#018x}")
            }
        }
    }
}

/// First diverging pair with enough context to print it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDivergence {
    pub event_index: usize,
    pub sequence_id: Option<SequenceId>,
    pub outcome: RawOutcome,
    pub dump: Vec<DumpLine>,
}

/// Raw-mode run summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawReport {
    pub events_compared: u64,
    pub matched: u64,
    pub empty_pairs: u64,
    pub tolerated_truncations: u64,
    /// Set when the run halted early.
    pub divergence: Option<RawDivergence>,
}

impl RawReport {
    pub fn is_clean(&self) -> bool {
        self.divergence.is_none()
    }
}

// ================= Resync mode =================

/// First differing 16-bit lane inside a sub-block pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HalfWordDiff {
    /// Word offset within the sub-block.
    pub word_index: usize,
    /// Lane 0 is the least significant half-word.
    pub lane: usize,
    pub a: u16,
    pub b: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubBlockMismatch {
    pub origin: OriginId,
    /// Index of the event in stream A.
    pub event_index: usize,
    /// Index of the matched event in stream B.
    pub event_index_b: usize,
    pub sequence_id: SequenceId,
    /// Position among the event's non-ignored sub-blocks.
    pub block_index: usize,
    pub len_a: usize,
    pub len_b: usize,
    /// `None` when the common prefix is equal and only the sizes differ.
    pub first_difference: Option<HalfWordDiff>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResyncFinding {
    SequenceMismatch {
        event_index: usize,
        expected: SequenceId,
        found: SequenceId,
    },
    DmbCountMismatch {
        event_index: usize,
        sequence_id: SequenceId,
        count_a: usize,
        count_b: usize,
    },
    SubBlock(SubBlockMismatch),
}

impl fmt::Display for ResyncFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResyncFinding::SequenceMismatch { event_index, expected, found } => write!(
                f,
                "L1A id mismatch at event {event_index}: {expected} vs {found}"
            ),
            ResyncFinding::DmbCountMismatch { event_index, sequence_id, count_a, count_b } => {
                write!(
                    f,
                    "Different number of DMBs in event {event_index} (L1A {sequence_id}): {count_a} vs {count_b}"
                )
            }
            ResyncFinding::SubBlock(m) => {
                write!(f, "{}, event {}, ", m.origin, m.event_index)?;
                if m.len_a != m.len_b {
                    write!(f, "size {} vs {}, ", m.len_a, m.len_b)?;
                }
                match m.first_difference {
                    Some(d) => write!(
                        f,
                        "first mismatched word = {:#06x} ---- {:#06x} (word {}, lane {})",
                        d.a, d.b, d.word_index, d.lane
                    ),
                    None => f.write_str("first mismatched word = none"),
                }
            }
        }
    }
}

/// Resync-mode run summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResyncReport {
    pub counters: CompareCounters,
    pub findings: Vec<ResyncFinding>,
}

impl ResyncReport {
    pub fn is_clean(&self) -> bool {
        self.counters.is_clean()
    }

    pub fn sub_block_mismatches(&self) -> impl Iterator<Item = &SubBlockMismatch> {
        self.findings.iter().filter_map(|f| match f {
            ResyncFinding::SubBlock(m) => Some(m),
            _ => None,
        })
    }
}
