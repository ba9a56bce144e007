//! unpack/annotate.rs
//! Human-readable labels for DMB-internal structure, used by mismatch dumps.
//!
//! Nothing here affects splitting; a wrong label is cosmetic.

use std::fmt;

use crate::constants::{
    ALCT_HEADER, ALCT_TRAILER, CFEB_SAMPLE_WORDS, DMB_HEADER2, DMB_MARKER_MASK, DMB_TRAILER1,
    DMB_TRAILER2, TMB_HEADER, TMB_TRAILER,
};
use crate::types::Word;
use crate::unpack::split::is_sub_header;
use crate::unpack::types::OriginId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    DmbHeader(Option<OriginId>),
    DmbHeader2,
    AlctHeader,
    AlctTrailer,
    TmbHeader,
    TmbTrailer,
    /// End of the Nth CFEB time sample (1-based).
    CfebSample(u32),
    DmbTrailer,
    DmbTrailer2,
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::DmbHeader(Some(o)) => write!(f, "DMB header ({o})"),
            Annotation::DmbHeader(None) => f.write_str("DMB header"),
            Annotation::DmbHeader2 => f.write_str("DMB header 2"),
            Annotation::AlctHeader => f.write_str("ALCT header"),
            Annotation::AlctTrailer => f.write_str("ALCT trailer"),
            Annotation::TmbHeader => f.write_str("TMB header"),
            Annotation::TmbTrailer => f.write_str("TMB trailer"),
            Annotation::CfebSample(n) => write!(f, "CFEB sample {n}"),
            Annotation::DmbTrailer => f.write_str("DMB trailer"),
            Annotation::DmbTrailer2 => f.write_str("DMB trailer 2"),
        }
    }
}

#[inline]
fn low_lane(w: Word) -> u16 {
    (w & 0xffff) as u16
}

#[inline]
fn high_lane(w: Word) -> u16 {
    (w >> 48) as u16
}

/// One optional label per word.
///
/// CFEB words are counted from the end of the last nested ALCT/TMB region (or
/// from DMB header 2 when there is none) up to the DMB trailer; every
/// `CFEB_SAMPLE_WORDS`th one closes a time sample.
pub fn annotate_words(words: &[Word]) -> Vec<Option<Annotation>> {
    let mut out = Vec::with_capacity(words.len());
    let mut in_dmb = false;
    let mut cfeb_active = false;
    let mut cfeb_words = 0usize;

    for (i, &w) in words.iter().enumerate() {
        let label = if is_sub_header(w) {
            in_dmb = true;
            cfeb_active = false;
            let origin = words.get(i + 1).map(|&next| OriginId::from_word(next));
            Some(Annotation::DmbHeader(origin))
        } else if !in_dmb {
            None
        } else if (w & DMB_MARKER_MASK) == DMB_HEADER2 {
            cfeb_active = true;
            cfeb_words = 0;
            Some(Annotation::DmbHeader2)
        } else if low_lane(w) == ALCT_HEADER {
            cfeb_active = false;
            Some(Annotation::AlctHeader)
        } else if high_lane(w) == ALCT_TRAILER {
            cfeb_active = true;
            cfeb_words = 0;
            Some(Annotation::AlctTrailer)
        } else if low_lane(w) == TMB_HEADER {
            cfeb_active = false;
            Some(Annotation::TmbHeader)
        } else if high_lane(w) == TMB_TRAILER {
            cfeb_active = true;
            cfeb_words = 0;
            Some(Annotation::TmbTrailer)
        } else if (w & DMB_MARKER_MASK) == DMB_TRAILER1 {
            cfeb_active = false;
            Some(Annotation::DmbTrailer)
        } else if (w & DMB_MARKER_MASK) == DMB_TRAILER2 {
            in_dmb = false;
            cfeb_active = false;
            Some(Annotation::DmbTrailer2)
        } else if cfeb_active {
            cfeb_words += 1;
            (cfeb_words % CFEB_SAMPLE_WORDS == 0)
                .then(|| Annotation::CfebSample((cfeb_words / CFEB_SAMPLE_WORDS) as u32))
        } else {
            None
        };
        out.push(label);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_dmb_frame_and_cfeb_samples() {
        let mut words = vec![
            0x9000_9000_9000_9000,
            0xa000_a000_a0c5_a000, // DMB header 2, crate 0x0c, board 5
        ];
        words.extend(std::iter::repeat(0x0123_0456_0789_0abc).take(50));
        words.push(0xf000_f000_f000_f000);
        words.push(0xe000_e000_e000_e000);

        let labels = annotate_words(&words);
        assert_eq!(labels[0], Some(Annotation::DmbHeader(Some(OriginId::new(0x0c, 5)))));
        assert_eq!(labels[1], Some(Annotation::DmbHeader2));
        assert_eq!(labels[2 + 24], Some(Annotation::CfebSample(1)));
        assert_eq!(labels[2 + 49], Some(Annotation::CfebSample(2)));
        assert_eq!(labels[52], Some(Annotation::DmbTrailer));
        assert_eq!(labels[53], Some(Annotation::DmbTrailer2));
        assert_eq!(labels.iter().filter(|l| l.is_some()).count(), 6);
    }

    #[test]
    fn nested_regions_restart_cfeb_count() {
        let words = vec![
            0x9000_9000_9000_9000,
            0xa000_a000_a000_a000,
            0x0000_0000_0000_db0a,
            0xde0d_0000_0000_0000,
            0x0000_0000_0000_db0c,
            0xde0f_0000_0000_0000,
        ];
        let labels = annotate_words(&words);
        assert_eq!(labels[2], Some(Annotation::AlctHeader));
        assert_eq!(labels[3], Some(Annotation::AlctTrailer));
        assert_eq!(labels[4], Some(Annotation::TmbHeader));
        assert_eq!(labels[5], Some(Annotation::TmbTrailer));
    }

    #[test]
    fn words_outside_a_dmb_are_unlabelled() {
        let labels = annotate_words(&[0x5000_0001_0000_0000, 0xf000_f000_f000_f000]);
        assert_eq!(labels, vec![None, None]);
    }
}
