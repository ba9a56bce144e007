use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::compare::dump::{dump_words, DumpLine};
use crate::compare::types::{HalfWordDiff, ResyncFinding, ResyncReport, SubBlockMismatch};
use crate::constants::{DEFAULT_IGNORED_ORIGINS, DEFAULT_SYNC_WINDOW};
use crate::stream::Event;
use crate::types::{DaqError, SequenceId};
use crate::unpack::{split, OriginId, SubBlock};
use crate::utils::word_lanes;

/// Sequence-aligned comparison settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResyncConfig {
    /// Boards left out of the comparison on both sides.
    pub ignore: Vec<OriginId>,
    /// Leading A events during which A may be skipped to catch up with B.
    pub sync_window: usize,
}

impl Default for ResyncConfig {
    fn default() -> Self {
        Self {
            ignore: DEFAULT_IGNORED_ORIGINS.iter().copied().map(OriginId::from).collect(),
            sync_window: DEFAULT_SYNC_WINDOW,
        }
    }
}

impl ResyncConfig {
    /// Missing fields fall back to the defaults.
    pub fn from_json(text: &str) -> Result<Self, DaqError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn is_ignored(&self, origin: OriginId) -> bool {
        self.ignore.contains(&origin)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResyncComparator {
    config: ResyncConfig,
}

fn sequence_of(event: &Event) -> SequenceId {
    event.sequence_id().unwrap_or(0)
}

/// First differing lane of the common prefix of two sub-blocks.
fn first_difference(a: &SubBlock<'_>, b: &SubBlock<'_>) -> Option<HalfWordDiff> {
    a.words
        .iter()
        .zip(b.words)
        .position(|(x, y)| x != y)
        .and_then(|word_index| {
            let la = word_lanes(a.words[word_index]);
            let lb = word_lanes(b.words[word_index]);
            (0..4).find(|&lane| la[lane] != lb[lane]).map(|lane| HalfWordDiff {
                word_index,
                lane,
                a: la[lane],
                b: lb[lane],
            })
        })
}

impl ResyncComparator {
    pub fn new(config: ResyncConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResyncConfig {
        &self.config
    }

    /// Sub-blocks of `event` that take part in the comparison.
    pub fn compared_blocks<'a>(&self, event: &'a Event) -> Vec<SubBlock<'a>> {
        split(event)
            .into_iter()
            .filter(|b| !self.config.is_ignored(b.origin))
            .collect()
    }

    /// Walk A, aligning B by sequence id, and compare matched events
    /// sub-block by sub-block. Never aborts on a data mismatch.
    pub fn compare(&self, events_a: &[Event], events_b: &[Event]) -> ResyncReport {
        let mut report = ResyncReport::default();
        let counters = &mut report.counters;
        let mut cursor_b = 0usize;

        for (index_a, event_a) in events_a.iter().enumerate() {
            let Some(id_a) = event_a.sequence_id() else {
                continue;
            };
            let blocks_a = self.compared_blocks(event_a);
            if blocks_a.is_empty() {
                continue;
            }
            if cursor_b >= events_b.len() {
                debug!(index_a, "stream B exhausted");
                break;
            }
            counters.events_checked += 1;

            // --- align B ---
            while cursor_b < events_b.len() && sequence_of(&events_b[cursor_b]) < id_a {
                cursor_b += 1;
                counters.skipped_sync_b += 1;
            }
            let Some(event_b) = events_b.get(cursor_b) else {
                debug!(index_a, "stream B exhausted while aligning");
                break;
            };
            let id_b = sequence_of(event_b);

            if id_a != id_b {
                if index_a < self.config.sync_window && id_a < id_b {
                    counters.skipped_sync_a += 1;
                } else {
                    warn!(index_a, id_a, id_b, "L1A id mismatch");
                    counters.sequence_mismatches += 1;
                    report.findings.push(ResyncFinding::SequenceMismatch {
                        event_index: index_a,
                        expected: id_a,
                        found: id_b,
                    });
                }
                continue;
            }

            let index_b = cursor_b;
            cursor_b += 1;
            counters.events_matched += 1;

            // --- compare sub-blocks ---
            // same ignore set on B, so block i of A pairs with block i of B
            let blocks_b = self.compared_blocks(event_b);
            if blocks_a.len() != blocks_b.len() {
                warn!(index_a, id_a, a = blocks_a.len(), b = blocks_b.len(), "different number of DMBs");
                counters.dmb_count_mismatches += 1;
                report.findings.push(ResyncFinding::DmbCountMismatch {
                    event_index: index_a,
                    sequence_id: id_a,
                    count_a: blocks_a.len(),
                    count_b: blocks_b.len(),
                });
            }

            for (block_index, (sa, sb)) in blocks_a.iter().zip(&blocks_b).enumerate() {
                counters.sub_blocks_checked += 1;
                let diff = first_difference(sa, sb);
                if diff.is_none() && sa.len() == sb.len() {
                    continue;
                }

                let mismatch = SubBlockMismatch {
                    origin: sa.origin,
                    event_index: index_a,
                    event_index_b: index_b,
                    sequence_id: id_a,
                    block_index,
                    len_a: sa.len(),
                    len_b: sb.len(),
                    first_difference: diff,
                };
                warn!(origin = %sa.origin, index_a, len_a = sa.len(), len_b = sb.len(), "DMB block mismatch");
                counters.sub_blocks_mismatched += 1;
                report.findings.push(ResyncFinding::SubBlock(mismatch));
            }
        }

        info!(
            checked = counters.events_checked,
            matched = counters.events_matched,
            mismatched_blocks = counters.sub_blocks_mismatched,
            "resync comparison finished"
        );
        report
    }

    /// Dump of the sub-block pair behind `mismatch`. Empty if the events no
    /// longer line up with the finding.
    pub fn dump_mismatch(
        &self,
        events_a: &[Event],
        events_b: &[Event],
        mismatch: &SubBlockMismatch,
    ) -> Vec<DumpLine> {
        let (Some(ea), Some(eb)) = (events_a.get(mismatch.event_index), events_b.get(mismatch.event_index_b))
        else {
            return Vec::new();
        };
        let blocks_a = self.compared_blocks(ea);
        let blocks_b = self.compared_blocks(eb);
        match (blocks_a.get(mismatch.block_index), blocks_b.get(mismatch.block_index)) {
            (Some(a), Some(b)) => dump_words(a.words, b.words),
            _ => Vec::new(),
        }
    }
}
