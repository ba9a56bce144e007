use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::compare::dump::{dump_words, DumpLine};
use crate::compare::types::{RawDivergence, RawOutcome, RawReport};
use crate::constants::{DDU_HEADER_LEN, DDU_TRAILER_LEN, DEFAULT_CAPTURE_CAP};
use crate::stream::sequence_id_of;
use crate::types::{DaqError, SequenceId, Word};

/// Word-for-word comparison settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCompareConfig {
    /// Extra leading words on side A.
    pub reference_offset: usize,
    pub skip_head: usize,
    pub skip_tail: usize,
    /// Capture depth; a side at or above it may be truncated.
    pub capture_cap: Option<usize>,
    /// `(len_a, len_b)` of a known empty event pair.
    pub empty_lengths: Option<(usize, usize)>,
}

impl Default for RawCompareConfig {
    fn default() -> Self {
        Self::ddu_vs_ddu()
    }
}

impl RawCompareConfig {
    /// Two captures of the same DDU output.
    pub const fn ddu_vs_ddu() -> Self {
        Self {
            reference_offset: 0,
            skip_head: 0,
            skip_tail: 0,
            capture_cap: None,
            empty_lengths: None,
        }
    }

    /// FED spy capture (A) against a DDU capture (B).
    pub const fn spy_vs_ddu() -> Self {
        Self {
            reference_offset: 1,
            skip_head: DDU_HEADER_LEN,
            skip_tail: DDU_TRAILER_LEN,
            capture_cap: Some(DEFAULT_CAPTURE_CAP),
            empty_lengths: Some((8, 6)),
        }
    }

    fn is_capped(&self, len_a: usize, len_b: usize) -> bool {
        self.capture_cap.is_some_and(|cap| len_a >= cap || len_b >= cap)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RawComparator {
    config: RawCompareConfig,
}

impl RawComparator {
    pub fn new(config: RawCompareConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RawCompareConfig {
        &self.config
    }

    /// Compare one pair. `a` is read at `i + reference_offset` against `b[i]`.
    pub fn compare(&self, a: &[Word], b: &[Word]) -> RawOutcome {
        let cfg = &self.config;
        let (len_a, len_b) = (a.len(), b.len());

        if cfg.empty_lengths == Some((len_a, len_b)) {
            return RawOutcome::EmptyPair;
        }

        let expected_b = len_a.saturating_sub(cfg.reference_offset);
        let truncated = len_b != expected_b;
        if truncated && !cfg.is_capped(len_a, len_b) {
            return RawOutcome::LengthMismatch { len_a, len_b };
        }

        let end = expected_b.min(len_b).saturating_sub(cfg.skip_tail);
        for index in cfg.skip_head..end {
            let (wa, wb) = (a[index + cfg.reference_offset], b[index]);
            if wa != wb {
                return RawOutcome::WordMismatch { index, a: wa, b: wb };
            }
        }

        if truncated {
            RawOutcome::TruncationTolerated { len_a, len_b }
        } else {
            RawOutcome::Match
        }
    }

    /// Side-by-side dump of a pair, trimmed by the configured skips.
    pub fn dump(&self, a: &[Word], b: &[Word]) -> Vec<DumpLine> {
        let cfg = &self.config;
        let a_start = (cfg.reference_offset + cfg.skip_head).min(a.len());
        let a_end = a.len().saturating_sub(cfg.skip_tail).max(a_start);
        let b_start = cfg.skip_head.min(b.len());
        let b_end = b.len().saturating_sub(cfg.skip_tail).max(b_start);
        dump_words(&a[a_start..a_end], &b[b_start..b_end])
    }

    /// Compare pairs in order, halting at the first divergence.
    ///
    /// Read errors from the pair source propagate; data mismatches end up in
    /// the report.
    pub fn run<A, B, I>(&self, pairs: I) -> Result<RawReport, DaqError>
    where
        A: AsRef<[Word]>,
        B: AsRef<[Word]>,
        I: IntoIterator<Item = Result<(A, B), DaqError>>,
    {
        let mut report = RawReport::default();
        for (event_index, pair) in pairs.into_iter().enumerate() {
            let (a, b) = pair?;
            if !self.record(&mut report, event_index, Some(a.as_ref()), Some(b.as_ref())) {
                break;
            }
        }
        Ok(report)
    }

    /// Compare two event streams in read order. When one stream ends while
    /// the other still yields an event, that event diverges against an
    /// empty one (`LengthMismatch` with a zero length on the missing side).
    pub fn run_in_order<A, B>(&self, a: A, b: B) -> Result<RawReport, DaqError>
    where
        A: IntoIterator<Item = Result<Vec<Word>, DaqError>>,
        B: IntoIterator<Item = Result<Vec<Word>, DaqError>>,
    {
        let (mut a, mut b) = (a.into_iter().fuse(), b.into_iter().fuse());
        let mut report = RawReport::default();
        for event_index in 0usize.. {
            let (ea, eb) = match (a.next().transpose()?, b.next().transpose()?) {
                (None, None) => break,
                pair => pair,
            };
            if !self.record(&mut report, event_index, ea.as_deref(), eb.as_deref()) {
                break;
            }
        }
        Ok(report)
    }

    /// Compare each event of `a` with the event of stream B carrying the
    /// same L1A id, read from `a[reference_offset]`. `fetch_b` returns
    /// `None` when B has no such event, which is a divergence. Events of B
    /// never asked for are not compared.
    pub fn run_by_sequence<A, F>(&self, a: A, mut fetch_b: F) -> Result<RawReport, DaqError>
    where
        A: IntoIterator<Item = Result<Vec<Word>, DaqError>>,
        F: FnMut(SequenceId) -> Result<Option<Vec<Word>>, DaqError>,
    {
        let mut report = RawReport::default();
        for (event_index, ea) in a.into_iter().enumerate() {
            let ea = ea?;
            let eb = match ea.get(self.config.reference_offset) {
                Some(&w) => fetch_b(sequence_id_of(w))?,
                None => None,
            };
            if !self.record(&mut report, event_index, Some(&ea), eb.as_deref()) {
                break;
            }
        }
        Ok(report)
    }

    /// Count one pair into `report`. `None` is a side with no event. Returns
    /// `false` once the streams diverge.
    fn record(
        &self,
        report: &mut RawReport,
        event_index: usize,
        a: Option<&[Word]>,
        b: Option<&[Word]>,
    ) -> bool {
        report.events_compared += 1;

        let outcome = match (a, b) {
            (Some(a), Some(b)) => self.compare(a, b),
            _ => RawOutcome::LengthMismatch {
                len_a: a.map_or(0, <[Word]>::len),
                len_b: b.map_or(0, <[Word]>::len),
            },
        };
        let (a, b) = (a.unwrap_or_default(), b.unwrap_or_default());

        match outcome {
            RawOutcome::Match => report.matched += 1,
            RawOutcome::EmptyPair => report.empty_pairs += 1,
            RawOutcome::TruncationTolerated { len_a, len_b } => {
                debug!(event_index, len_a, len_b, "capture truncated, overlap compared");
                report.tolerated_truncations += 1;
            }
            RawOutcome::LengthMismatch { .. } | RawOutcome::WordMismatch { .. } => {
                let sequence_id = b
                    .first()
                    .or_else(|| a.get(self.config.reference_offset))
                    .map(|&w| sequence_id_of(w));
                warn!(event_index, ?sequence_id, %outcome, "streams diverge");
                report.divergence = Some(RawDivergence {
                    event_index,
                    sequence_id,
                    outcome,
                    dump: self.dump(a, b),
                });
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_and_skips_are_applied() {
        let cmp = RawComparator::new(RawCompareConfig::spy_vs_ddu());
        let b: Vec<Word> = (0..10).collect();
        let mut a = vec![0xdead];
        a.extend(&b);
        // head/tail differences are outside the compared region
        a[1] = 0xffff;
        a[10] = 0xffff;
        assert_eq!(cmp.compare(&a, &b), RawOutcome::Match);

        a[5] = 0xbeef;
        assert_eq!(cmp.compare(&a, &b), RawOutcome::WordMismatch { index: 4, a: 0xbeef, b: 4 });
    }

    #[test]
    fn empty_pair_is_not_a_divergence() {
        let cmp = RawComparator::new(RawCompareConfig::spy_vs_ddu());
        let outcome = cmp.compare(&[0; 8], &[1; 6]);
        assert_eq!(outcome, RawOutcome::EmptyPair);
        assert!(!outcome.is_divergence());
    }

    #[test]
    fn dump_is_trimmed_by_skips() {
        let cmp = RawComparator::new(RawCompareConfig::spy_vs_ddu());
        let b: Vec<Word> = (0..10).collect();
        let mut a = vec![0];
        a.extend(&b);
        let lines = cmp.dump(&a, &b);
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|l| !l.mismatch));
    }
}
